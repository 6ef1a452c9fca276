use std::io::Write;
use std::path::Path;

use crate::config::TrackConfig;
use crate::engine::{StormGroup, TiltSlot};
use crate::store::{NOT_FOUND, UNAVAILABLE};

/// Write the StormGroup sequence as one CSV row per time step.
///
/// Unpopulated fields carry one of the two sentinels: `NOT_FOUND` for a slot
/// the engine searched without success, `UNAVAILABLE` for a slot that is
/// structurally absent from the case data.
pub fn write_groups<W: Write>(
    writer: W,
    cfg: &TrackConfig,
    groups: &[StormGroup],
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = vec!["seq".into(), "time".into()];
    for &tilt in &cfg.tilts_deg {
        let label = tilt_label(tilt);
        for field in ["lat", "lon", "shear_max", "shear_min", "nearby"] {
            header.push(format!("{label}_{field}"));
        }
    }
    header.extend(
        [
            "mean_lat",
            "mean_lon",
            "cell_lat",
            "cell_lon",
            "cell_vil_avg",
            "cell_vil_max",
            "cell_refl_max",
            "cell_nearby",
            "top_lat",
            "top_lon",
            "top_max_km",
            "top_p90_km",
        ]
        .map(String::from),
    );
    out.write_record(&header)?;

    for group in groups {
        let mut row: Vec<String> = vec![
            group.index.to_string(),
            group.timestamp.to_rfc3339(),
        ];

        for i in 0..group.shear.slot_count() {
            match group.shear.slot(i) {
                TiltSlot::Found(c) => {
                    row.push(num(c.lat_deg));
                    row.push(num(c.lon_deg));
                    row.push(num(c.shear_max));
                    row.push(num(c.shear_min));
                    row.push(c.nearby_count.to_string());
                }
                TiltSlot::NotFound => row.extend(std::iter::repeat(num(NOT_FOUND)).take(5)),
                TiltSlot::TiltAbsent => row.extend(std::iter::repeat(num(UNAVAILABLE)).take(5)),
            }
        }

        let mean = group.shear.mean_centroid();
        row.push(num(mean.lat_deg));
        row.push(num(mean.lon_deg));

        match &group.cell {
            Some(c) => {
                row.push(num(c.lat_deg));
                row.push(num(c.lon_deg));
                row.push(num(c.vil_avg));
                row.push(num(c.vil_max));
                row.push(num(c.refl_max));
                row.push(c.nearby_count.to_string());
            }
            None => row.extend(std::iter::repeat(num(NOT_FOUND)).take(6)),
        }
        match &group.top {
            Some(t) => {
                row.push(num(t.lat_deg));
                row.push(num(t.lon_deg));
                row.push(num(t.top_max_km));
                row.push(num(t.top_p90_km));
            }
            None => row.extend(std::iter::repeat(num(NOT_FOUND)).take(4)),
        }

        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_groups_path(
    path: &Path,
    cfg: &TrackConfig,
    groups: &[StormGroup],
) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path).map_err(csv::Error::from)?;
    write_groups(file, cfg, groups)
}

fn num(v: f64) -> String {
    format!("{v:.6}")
}

/// "0.5" -> "t0_5", used in column names.
fn tilt_label(tilt_deg: f64) -> String {
    format!("t{tilt_deg:.1}").replace('.', "_")
}

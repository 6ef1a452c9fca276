mod error;
mod rows;

pub use error::LoadError;
pub use rows::{parse_sense, CellRow, ShearRow, TopRow};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::geo::GeoPoint;
use crate::store::CaseStore;

/// The case descriptor: where and when the severe report happened.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseSpec {
    pub report: ReportSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSpec {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub time: DateTime<Utc>,
}

impl ReportSpec {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat_deg, self.lon_deg)
    }
}

/// Load a case directory: `case.yaml` plus `shear.csv`, and `cells.csv` /
/// `tops.csv` when present. An absent auxiliary table is not an error, the
/// matching steps just find nothing.
pub fn load_case(dir: &Path) -> Result<(CaseSpec, CaseStore), LoadError> {
    let yaml = std::fs::read_to_string(dir.join("case.yaml"))?;
    let spec: CaseSpec = serde_yaml::from_str(&yaml)?;

    let mut store = CaseStore::new();
    read_shear_csv(File::open(dir.join("shear.csv"))?, &mut store)?;

    for (name, kind) in [("cells.csv", Aux::Cells), ("tops.csv", Aux::Tops)] {
        let path = dir.join(name);
        if !path.exists() {
            log::warn!("{} not present, continuing without it", path.display());
            continue;
        }
        match kind {
            Aux::Cells => read_cells_csv(File::open(path)?, &mut store)?,
            Aux::Tops => read_tops_csv(File::open(path)?, &mut store)?,
        }
    }

    log::info!(
        "loaded case: {} scan times, report at ({:.4}, {:.4}) {}",
        store.len(),
        spec.report.lat_deg,
        spec.report.lon_deg,
        spec.report.time
    );
    Ok((spec, store))
}

enum Aux {
    Cells,
    Tops,
}

pub fn read_shear_csv<R: Read>(reader: R, store: &mut CaseStore) -> Result<(), LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    for row in rdr.deserialize::<ShearRow>() {
        let (sense, cluster) = row?.into_cluster()?;
        store.push_shear(sense, cluster);
    }
    Ok(())
}

pub fn read_cells_csv<R: Read>(reader: R, store: &mut CaseStore) -> Result<(), LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    for row in rdr.deserialize::<CellRow>() {
        store.push_cell(row?.into_cluster());
    }
    Ok(())
}

pub fn read_tops_csv<R: Read>(reader: R, store: &mut CaseStore) -> Result<(), LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    for row in rdr.deserialize::<TopRow>() {
        store.push_top(row?.into_cluster());
    }
    Ok(())
}

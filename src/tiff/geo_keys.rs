//! GeoKey directory parsing
//!
//! The GeoKeyDirectoryTag holds a header of four SHORTs (version, revision,
//! minor revision, key count) followed by one four-SHORT entry per key:
//! key id, tag location, count and value or index. Keys whose location is 0
//! carry their value inline; others index GeoDoubleParams or GeoAsciiParams.

use log::debug;

use crate::tiff::constants::geo_keys;
use crate::tiff::errors::{TiffError, TiffResult};

/// One key of the GeoKey directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

impl GeoKeyEntry {
    pub fn new(key_id: u16, tiff_tag_location: u16, count: u16, value_offset: u16) -> Self {
        GeoKeyEntry { key_id, tiff_tag_location, count, value_offset }
    }

    /// Inline SHORT value, when the key stores one
    pub fn short_value(&self) -> Option<u16> {
        if self.tiff_tag_location == 0 {
            Some(self.value_offset)
        } else {
            None
        }
    }
}

/// Parsed GeoKey directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoKeyDirectory {
    pub version: u16,
    pub revision: u16,
    pub minor_revision: u16,
    pub entries: Vec<GeoKeyEntry>,
}

impl GeoKeyDirectory {
    /// Parses the directory from the tag's SHORT values
    pub fn parse(values: &[u64]) -> TiffResult<Self> {
        if values.len() < 4 {
            return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
        }

        let short = |v: u64| v as u16;
        let num_keys = values[3] as usize;
        if values.len() < 4 + num_keys * 4 {
            return Err(TiffError::GenericError(format!(
                "GeoKey directory declares {} keys but holds {} values", num_keys, values.len())));
        }

        let entries = values[4..4 + num_keys * 4]
            .chunks_exact(4)
            .map(|k| GeoKeyEntry::new(short(k[0]), short(k[1]), short(k[2]), short(k[3])))
            .collect::<Vec<_>>();

        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], entries.len());

        Ok(GeoKeyDirectory {
            version: short(values[0]),
            revision: short(values[1]),
            minor_revision: short(values[2]),
            entries,
        })
    }

    /// Minimal directory for a raster in the given EPSG code
    ///
    /// Codes in the 4000-4999 range are taken as geographic systems, anything
    /// else as projected.
    pub fn for_epsg(epsg: u16) -> Self {
        let geographic = (4000..5000).contains(&epsg);
        let (model_type, cs_key) = if geographic {
            (2, geo_keys::GEOGRAPHIC_TYPE)
        } else {
            (1, geo_keys::PROJECTED_CS_TYPE)
        };

        GeoKeyDirectory {
            version: 1,
            revision: 1,
            minor_revision: 0,
            entries: vec![
                GeoKeyEntry::new(geo_keys::GT_MODEL_TYPE, 0, 1, model_type),
                GeoKeyEntry::new(geo_keys::GT_RASTER_TYPE, 0, 1, 1),
                GeoKeyEntry::new(cs_key, 0, 1, epsg),
            ],
        }
    }

    pub fn get(&self, key_id: u16) -> Option<&GeoKeyEntry> {
        self.entries.iter().find(|e| e.key_id == key_id)
    }

    /// EPSG code of the raster's coordinate system, when declared
    ///
    /// The projected system wins over the geographic one; user-defined
    /// codes do not count.
    pub fn epsg(&self) -> Option<u32> {
        [geo_keys::PROJECTED_CS_TYPE, geo_keys::GEOGRAPHIC_TYPE]
            .iter()
            .filter_map(|key| self.get(*key).and_then(GeoKeyEntry::short_value))
            .find(|code| *code != 0 && *code != geo_keys::USER_DEFINED)
            .map(u32::from)
    }

    /// Flattened SHORT values as written to the tag
    pub fn to_values(&self) -> Vec<u16> {
        let mut values = vec![self.version, self.revision, self.minor_revision, self.entries.len() as u16];
        for entry in &self.entries {
            values.extend_from_slice(&[entry.key_id, entry.tiff_tag_location, entry.count, entry.value_offset]);
        }
        values
    }
}

/// GeoKey directory together with the parameter tags it points into
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKeys {
    pub directory: GeoKeyDirectory,
    pub double_params: Vec<f64>,
    pub ascii_params: Option<String>,
}

impl GeoKeys {
    pub fn new(directory: GeoKeyDirectory) -> Self {
        GeoKeys { directory, double_params: Vec::new(), ascii_params: None }
    }

    pub fn epsg(&self) -> Option<u32> {
        self.directory.epsg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_projected_epsg() {
        let values: Vec<u64> = vec![1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32633];
        let dir = GeoKeyDirectory::parse(&values).unwrap();
        assert_eq!(dir.entries.len(), 3);
        assert_eq!(dir.epsg(), Some(32633));
        let round: Vec<u64> = dir.to_values().into_iter().map(u64::from).collect();
        assert_eq!(round, values);
    }

    #[test]
    fn test_user_defined_projection_falls_back_to_geographic() {
        let values: Vec<u64> = vec![1, 1, 0, 2, 3072, 0, 1, 32767, 2048, 0, 1, 4326];
        assert_eq!(GeoKeyDirectory::parse(&values).unwrap().epsg(), Some(4326));
    }

    #[test]
    fn test_truncated_directory_is_an_error() {
        assert!(GeoKeyDirectory::parse(&[1, 1, 0, 2, 1024, 0, 1]).is_err());
        assert!(GeoKeyDirectory::parse(&[1, 1]).is_err());
    }

    #[test]
    fn test_for_epsg_picks_key() {
        assert_eq!(GeoKeyDirectory::for_epsg(4326).get(geo_keys::GEOGRAPHIC_TYPE).map(|e| e.value_offset), Some(4326));
        assert_eq!(GeoKeyDirectory::for_epsg(32633).epsg(), Some(32633));
    }
}

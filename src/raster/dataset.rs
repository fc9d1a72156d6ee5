//! Georeferenced single-band raster access
//!
//! `GeoRaster` loads the metadata of a GeoTIFF's first image once and then
//! serves band-1 windows from strips or tiles on demand.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};

use crate::compression::CompressionFactory;
use crate::io::seekable::SeekableReader;
use crate::raster::block::BlockDecoder;
use crate::raster::geotransform::GeoTransform;
use crate::raster::region::Region;
use crate::raster::sample::SampleType;
use crate::raster::strip_reader::StripReader;
use crate::raster::tile_reader::TileReader;
use crate::raster::window::RasterWindow;
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo_keys::{GeoKeyDirectory, GeoKeys};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;

/// How pixel data is organised on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockLayout {
    Strips { rows_per_strip: u32 },
    Tiles { tile_width: u32, tile_height: u32 },
}

/// A single-band view of a GeoTIFF
pub struct GeoRaster {
    path: PathBuf,
    reader: TiffReader,
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u16,
    pub sample_type: SampleType,
    pub planar_configuration: u16,
    pub compression: u64,
    pub predictor: u16,
    pub layout: BlockLayout,
    pub geo_transform: GeoTransform,
    /// False when the transform is the pixel-space fallback
    pub georeferenced: bool,
    pub geo_keys: Option<GeoKeys>,
    pub nodata: Option<f64>,
    /// Raw GDAL_NODATA text, written back unchanged to derived tiles
    pub nodata_text: Option<String>,
    offsets: Vec<u64>,
    byte_counts: Vec<u64>,
    file_size: u64,
}

impl GeoRaster {
    /// Opens a GeoTIFF and reads the metadata of its first image
    pub fn open(path: &Path) -> TiffResult<Self> {
        let mut reader = TiffReader::new();
        let tiff = reader.load(path)?;
        let ifd = tiff.main_ifd().ok_or(TiffError::InvalidHeader)?;

        let mut file = reader.create_reader()?;
        let file_size = validation::get_file_size(&mut file)?;

        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as u32, height as u32);
        let samples_per_pixel = ifd.get_samples_per_pixel() as u16;

        let bits = first_value(&reader, &mut file, ifd, tags::BITS_PER_SAMPLE)?.unwrap_or(1) as u16;
        let format = first_value(&reader, &mut file, ifd, tags::SAMPLE_FORMAT)?
            .unwrap_or(sample_format::UNSIGNED as u64) as u16;
        let sample_type = SampleType::from_tags(bits, format)?;

        let planar_configuration = ifd.get_tag_value(tags::PLANAR_CONFIGURATION)
            .unwrap_or(planar_config::CHUNKY as u64) as u16;
        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64);
        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;
        CompressionFactory::create_handler(compression)?;

        let (layout, offsets, byte_counts) = if ifd.is_tiled() {
            let layout = BlockLayout::Tiles {
                tile_width: ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as u32,
                tile_height: ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as u32,
            };
            (layout,
             reader.read_tag_values(&mut file, ifd, tags::TILE_OFFSETS)?,
             reader.read_tag_values(&mut file, ifd, tags::TILE_BYTE_COUNTS)?)
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .map(|r| r.min(height as u64) as u32)
                .unwrap_or(height);
            (BlockLayout::Strips { rows_per_strip },
             reader.read_tag_values(&mut file, ifd, tags::STRIP_OFFSETS)?,
             reader.read_tag_values(&mut file, ifd, tags::STRIP_BYTE_COUNTS)?)
        };

        if offsets.len() != byte_counts.len() {
            return Err(TiffError::GenericError(format!(
                "Mismatch between {} block offsets and {} byte counts", offsets.len(), byte_counts.len())));
        }

        let (geo_transform, georeferenced) = match read_geo_transform(&reader, &mut file, ifd)? {
            Some(transform) => (transform, true),
            None => {
                warn!("{} carries no usable georeferencing, using pixel coordinates", path.display());
                (GeoTransform::identity(), false)
            }
        };

        let geo_keys = read_geo_keys(&reader, &mut file, ifd)?;

        let nodata_text = if ifd.has_tag(tags::GDAL_NODATA) {
            Some(reader.read_ascii(&mut file, ifd, tags::GDAL_NODATA)?)
        } else {
            None
        };
        let nodata = nodata_text.as_deref().and_then(|text| {
            let parsed = sample_type.parse_nodata(text);
            if parsed.is_none() {
                warn!("Ignoring unparsable nodata value '{}'", text);
            }
            parsed
        });

        info!("Opened {}: {}x{} {:?}, {} samples/pixel, compression {}, nodata {:?}",
              path.display(), width, height, sample_type, samples_per_pixel, compression, nodata);

        Ok(GeoRaster {
            path: path.to_path_buf(),
            reader,
            width,
            height,
            samples_per_pixel,
            sample_type,
            planar_configuration,
            compression,
            predictor,
            layout,
            geo_transform,
            georeferenced,
            geo_keys,
            nodata,
            nodata_text,
            offsets,
            byte_counts,
            file_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// EPSG code of the raster's coordinate system, when declared
    pub fn epsg(&self) -> Option<u32> {
        self.geo_keys.as_ref().and_then(GeoKeys::epsg)
    }

    /// Reads band 1 for a pixel window
    pub fn read_window(&self, region: Region) -> TiffResult<RasterWindow> {
        region.validate_within(self.width, self.height)?;

        let handler = self.reader.handler()?;
        let decoder = BlockDecoder::new(
            self.compression,
            handler,
            self.sample_type,
            self.samples_per_pixel as usize,
            self.planar_configuration,
            self.predictor,
            self.file_size,
        )?;

        let file = BufReader::with_capacity(1024 * 1024, File::open(&self.path)?);
        let values = match self.layout {
            BlockLayout::Strips { rows_per_strip } => StripReader::new(
                file, &decoder, &self.offsets, &self.byte_counts,
                self.width, self.height, rows_per_strip,
            ).read(region)?,
            BlockLayout::Tiles { tile_width, tile_height } => TileReader::new(
                file, &decoder, &self.offsets, &self.byte_counts,
                self.width, tile_width, tile_height,
            )?.read(region)?,
        };

        debug!("Read window {:?} from {}", region, self.path.display());
        Ok(RasterWindow::new(region.width, region.height, self.sample_type, values, self.nodata))
    }

    /// Reads the whole band
    pub fn read_all(&self) -> TiffResult<RasterWindow> {
        self.read_window(Region::full(self.width, self.height))
    }
}

fn first_value(reader: &TiffReader, file: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Option<u64>> {
    if !ifd.has_tag(tag) {
        return Ok(None);
    }
    Ok(reader.read_tag_values(file, ifd, tag)?.first().copied())
}

fn read_geo_transform(reader: &TiffReader, file: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Option<GeoTransform>> {
    if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
        let scale = reader.read_f64_values(file, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tiepoint = reader.read_f64_values(file, ifd, tags::MODEL_TIEPOINT_TAG)?;
        if let Some(transform) = GeoTransform::from_scale_and_tiepoint(&scale, &tiepoint) {
            return Ok(Some(transform));
        }
        warn!("Invalid pixel scale {:?} or tiepoint {:?}", scale, tiepoint);
    }

    if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
        let matrix = reader.read_f64_values(file, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        match GeoTransform::from_model_transformation(&matrix) {
            Some(transform) => return Ok(Some(transform)),
            None => warn!("Rotated or degenerate ModelTransformation is not supported"),
        }
    }

    Ok(None)
}

fn read_geo_keys(reader: &TiffReader, file: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Option<GeoKeys>> {
    if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
        return Ok(None);
    }

    let values = reader.read_tag_values(file, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
    let mut keys = GeoKeys::new(GeoKeyDirectory::parse(&values)?);

    if ifd.has_tag(tags::GEO_DOUBLE_PARAMS_TAG) {
        keys.double_params = reader.read_f64_values(file, ifd, tags::GEO_DOUBLE_PARAMS_TAG)?;
    }
    if ifd.has_tag(tags::GEO_ASCII_PARAMS_TAG) {
        keys.ascii_params = Some(reader.read_ascii(file, ifd, tags::GEO_ASCII_PARAMS_TAG)?);
    }

    Ok(Some(keys))
}

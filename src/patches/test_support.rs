use crate::raster::{RasterWindow, SampleType};

/// Window from rows of '#' (valid) and '.' (nodata)
pub(crate) fn window_from_ascii(rows: &[&str]) -> RasterWindow {
    let height = rows.len() as u32;
    let width = rows[0].len() as u32;
    let values = rows.iter()
        .flat_map(|row| row.chars().map(|c| if c == '#' { 1.0 } else { 0.0 }))
        .collect();
    RasterWindow::new(width, height, SampleType::U8, values, Some(0.0))
}

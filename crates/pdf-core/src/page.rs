//! Page geometry and unit conversion

/// Points per millimetre (72 pt per inch, 25.4 mm per inch)
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimetres to PDF points
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Convert PDF points to millimetres
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_MM
}

/// Physical page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 portrait, 210 x 297 mm
    pub const A4: PageSize = PageSize {
        width: 210.0 * PT_PER_MM,
        height: 297.0 * PT_PER_MM,
    };

    /// Create a page size from millimetres
    pub fn from_mm(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width: mm_to_pt(width_mm),
            height: mm_to_pt(height_mm),
        }
    }

    /// Width in millimetres
    pub fn width_mm(&self) -> f64 {
        pt_to_mm(self.width)
    }

    /// Height in millimetres
    pub fn height_mm(&self) -> f64 {
        pt_to_mm(self.height)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

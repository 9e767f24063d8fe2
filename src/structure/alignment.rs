// Tue Jan 13 2026 - Alex

/// Register-file alignment used by container buffers.
pub const ALIGN_16: usize = 16;
/// Default alignment between untagged shader fields.
pub const ALIGN_4: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alignment {
    value: usize,
}

impl Alignment {
    pub fn new(value: usize) -> Self {
        assert!(value > 0 && value.is_power_of_two());
        Self { value }
    }

    pub fn register() -> Self {
        Self::new(ALIGN_16)
    }

    pub fn scalar() -> Self {
        Self::new(ALIGN_4)
    }

    pub fn as_usize(&self) -> usize {
        self.value
    }

    pub fn align(&self, offset: usize) -> usize {
        offset.saturating_add(self.value - 1) & !(self.value - 1)
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::scalar()
    }
}

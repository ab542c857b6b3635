/// File format versions for FlatQL
///
/// The catalog is binary and versioned; table files are plain text and
/// carry no header.
/// Catalog format version
pub const CATALOG_FORMAT_VERSION: u16 = 1;

/// Magic numbers for file validation
pub mod magic {
    /// Catalog magic: "FQCT" (FlatQL CaTalog)
    pub const CATALOG: u32 = 0x4651_4354;
}

/// Version compatibility information
pub struct FormatVersion {
    /// Current version of this format
    pub current: u16,
    /// Minimum supported version for reading
    pub min_read: u16,
}

impl FormatVersion {
    /// Check if a version can be read
    pub fn can_read(&self, version: u16) -> bool {
        version >= self.min_read && version <= self.current
    }
}

/// Catalog format version info
pub fn catalog_version() -> FormatVersion {
    FormatVersion {
        current: CATALOG_FORMAT_VERSION,
        min_read: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_compatibility() {
        let v = catalog_version();
        assert!(v.can_read(1));
        assert!(!v.can_read(0));
        assert!(!v.can_read(999));
    }
}

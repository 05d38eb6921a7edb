//! TOML export of a resolved layout
//!
//! ```toml
//! device = "mmcblk0"
//!
//! [[region]]
//! number = 1
//! name = "boot"
//! image = "boot.img"
//! offset = 0
//! size = 262144
//! used = 262144
//! ```

use std::path::Path;

use super::ResolvedLayout;

impl ResolvedLayout {
    /// Convert the layout to a TOML document
    pub fn to_toml_string(&self) -> Result<String, ::toml::ser::Error> {
        ::toml::to_string(self)
    }

    /// Save the layout as a TOML file
    pub fn to_toml_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

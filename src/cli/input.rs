use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;

#[cfg(feature = "hdf5")]
use xsqtools::xsq::Hdf5Opener;
#[cfg(not(feature = "hdf5"))]
use xsqtools::xsq::MemoryXsq;

#[derive(Parser, Debug)]
pub struct InputXsq {
    #[clap(help = "Input XSQ file")]
    pub input: String,
}
impl InputXsq {
    pub fn path(&self) -> &Path {
        Path::new(&self.input)
    }

    /// Directory holding the input file (used as the default output directory)
    pub fn parent_dir(&self) -> PathBuf {
        self.path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    fn validate(&self) -> Result<()> {
        if !self.path().is_file() {
            bail!("Input file does not exist: {}", self.input);
        }
        Ok(())
    }

    #[cfg(feature = "hdf5")]
    pub fn opener(&self) -> Result<Hdf5Opener> {
        self.validate()?;
        Ok(Hdf5Opener::new(&self.input))
    }

    #[cfg(not(feature = "hdf5"))]
    pub fn opener(&self) -> Result<MemoryXsq> {
        self.validate()?;
        bail!(
            "Unable to read {}: xsqtools was built without HDF5 support (enable the `hdf5` feature)",
            self.input
        )
    }
}

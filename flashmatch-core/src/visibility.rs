//! Voxelized photon visibility library.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use crate::services::Visibility;
use crate::track::Point3;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Regular voxel grid holding a visibility vector per voxel.
///
/// Voxels are stored x-fastest: `index = ix + nx * (iy + ny * iz)`.
/// A voxel with an empty vector is treated as outside the library.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisibilityLibrary {
    /// Lower corner of the grid (cm).
    pub min: Point3,
    /// Upper corner of the grid (cm).
    pub max: Point3,
    /// Divisions along x, y and z.
    pub divisions: [usize; 3],
    /// Number of optical channels per voxel.
    pub channel_count: usize,
    /// Per-voxel visibilities.
    pub voxels: Vec<Vec<f64>>,
}

impl VisibilityLibrary {
    /// Creates a library and checks its shape.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] when the voxel count does not match the
    /// divisions or the bounds are degenerate, and
    /// [`Error::ChannelCountMismatch`] when a populated voxel has the wrong
    /// number of channels.
    pub fn new(
        min: Point3,
        max: Point3,
        divisions: [usize; 3],
        channel_count: usize,
        voxels: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let library = Self {
            min,
            max,
            divisions,
            channel_count,
            voxels,
        };
        library.validate()?;
        Ok(library)
    }

    /// A single-voxel library returning `visibility` for every channel
    /// anywhere inside `[min, max]`.
    #[must_use]
    pub fn uniform(min: Point3, max: Point3, channel_count: usize, visibility: f64) -> Self {
        Self {
            min,
            max,
            divisions: [1, 1, 1],
            channel_count,
            voxels: vec![vec![visibility; channel_count]],
        }
    }

    /// Checks the library shape.
    ///
    /// # Errors
    /// See [`VisibilityLibrary::new`].
    pub fn validate(&self) -> Result<()> {
        let expected: usize = self.divisions.iter().product();
        if expected == 0 || expected != self.voxels.len() {
            return Err(Error::ConfigError(format!(
                "visibility library has {} voxels, divisions {:?} need {}",
                self.voxels.len(),
                self.divisions,
                expected
            )));
        }
        if self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z {
            return Err(Error::ConfigError(
                "visibility library bounds are empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .voxels
            .iter()
            .find(|v| !v.is_empty() && v.len() != self.channel_count)
        {
            return Err(Error::ChannelCountMismatch {
                expected: self.channel_count,
                found: bad.len(),
            });
        }
        Ok(())
    }

    /// Voxel index containing `point`, if any.
    #[must_use]
    pub fn voxel_index(&self, point: &Point3) -> Option<usize> {
        let ix = axis_bin(point.x, self.min.x, self.max.x, self.divisions[0])?;
        let iy = axis_bin(point.y, self.min.y, self.max.y, self.divisions[1])?;
        let iz = axis_bin(point.z, self.min.z, self.max.z, self.divisions[2])?;
        Some(ix + self.divisions[0] * (iy + self.divisions[1] * iz))
    }
}

fn axis_bin(value: f64, lo: f64, hi: f64, divisions: usize) -> Option<usize> {
    if !(lo..=hi).contains(&value) {
        return None;
    }
    let fraction = (value - lo) / (hi - lo);
    let bin = (fraction * divisions as f64).floor() as usize;
    // the upper edge belongs to the last bin
    Some(bin.min(divisions - 1))
}

impl Visibility for VisibilityLibrary {
    fn visibility_at(&self, point: &Point3) -> &[f64] {
        self.voxel_index(point)
            .and_then(|idx| self.voxels.get(idx))
            .map_or(&[][..], Vec::as_slice)
    }
}

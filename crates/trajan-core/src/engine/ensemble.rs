use nalgebra::Vector3;

use super::error::AnalysisError;
use crate::core::io::dcd::Coordinates;
use crate::core::utils::geometry::{calculate_rmsd, superpose};

/// A set of conformations of the same atoms, plus the reference conformation
/// they are compared against.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    reference: Coordinates,
    coordsets: Vec<Coordinates>,
}

impl Ensemble {
    pub fn new(reference: Coordinates) -> Self {
        Self {
            reference,
            coordsets: Vec::new(),
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.reference.len()
    }

    pub fn n_coordsets(&self) -> usize {
        self.coordsets.len()
    }

    pub fn add_coordset(&mut self, coords: Coordinates) -> Result<(), AnalysisError> {
        if coords.len() != self.reference.len() {
            return Err(AnalysisError::Internal(format!(
                "coordinate set {} has {} atoms, ensemble has {}",
                self.coordsets.len(),
                coords.len(),
                self.reference.len()
            )));
        }
        self.coordsets.push(coords);
        Ok(())
    }

    pub fn extend<I>(&mut self, coordsets: I) -> Result<(), AnalysisError>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        for coords in coordsets {
            self.add_coordset(coords)?;
        }
        Ok(())
    }

    /// Superposes every coordinate set onto the reference independently.
    pub fn superpose(&mut self) -> Result<(), AnalysisError> {
        for (index, coords) in self.coordsets.iter_mut().enumerate() {
            superpose(coords, &self.reference).ok_or_else(|| {
                AnalysisError::Internal(format!("superposition of coordinate set {} failed", index))
            })?;
        }
        Ok(())
    }

    /// RMSD of each coordinate set from the reference, in insertion order.
    pub fn rmsds(&self) -> Vec<f64> {
        self.coordsets
            .iter()
            .map(|coords| calculate_rmsd(coords, &self.reference).unwrap_or(0.0))
            .collect()
    }

    /// Per-atom fluctuation around the mean position over all coordinate sets.
    ///
    /// The reference does not contribute to the mean. Returns `None` when the
    /// ensemble holds no coordinate sets.
    pub fn rmsfs(&self) -> Option<Vec<f64>> {
        if self.coordsets.is_empty() {
            return None;
        }
        let n_sets = self.coordsets.len() as f64;

        let mut mean = vec![Vector3::<f64>::zeros(); self.n_atoms()];
        for coords in &self.coordsets {
            for (sum, point) in mean.iter_mut().zip(coords) {
                *sum += point.coords;
            }
        }
        for sum in mean.iter_mut() {
            *sum /= n_sets;
        }

        let mut squared = vec![0.0; self.n_atoms()];
        for coords in &self.coordsets {
            for ((acc, point), center) in squared.iter_mut().zip(coords).zip(&mean) {
                *acc += (point.coords - center).norm_squared();
            }
        }
        Some(squared.into_iter().map(|s| (s / n_sets).sqrt()).collect())
    }

    pub fn into_coordsets(self) -> Vec<Coordinates> {
        self.coordsets
    }
}

//! # Visibility Classification
//!
//! Every material index falls into one of three classes. A face is drawn
//! where a cell's class strictly outranks its neighbour's.

use voxstream_shared::GridParameters;

/// Visibility rank of a cell. Ordering: `Empty < Translucent < Opaque`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisibilityClass {
    /// Nothing to draw.
    Empty,
    /// Drawn, but faces behind it stay visible.
    Translucent,
    /// Drawn and hides whatever is behind it.
    Opaque,
}

/// Material index to [`VisibilityClass`] lookup table.
///
/// Built once per session. Indices past the end of the material table are
/// `Empty`.
#[derive(Clone, Debug)]
pub struct VisibilityClassifier {
    classes: Box<[VisibilityClass]>,
    empty_index: u16,
}

impl VisibilityClassifier {
    /// Builds the table from the session's material list.
    #[must_use]
    pub fn new(params: &GridParameters) -> Self {
        let classes = params
            .materials
            .iter()
            .enumerate()
            .map(|(i, material)| {
                if i == usize::from(params.empty_material_index) {
                    VisibilityClass::Empty
                } else if material.blend_mode.is_translucent() {
                    VisibilityClass::Translucent
                } else {
                    VisibilityClass::Opaque
                }
            })
            .collect();
        Self {
            classes,
            empty_index: params.empty_material_index,
        }
    }

    /// Class of a material index.
    #[inline]
    #[must_use]
    pub fn classify(&self, material_index: u16) -> VisibilityClass {
        self.classes
            .get(usize::from(material_index))
            .copied()
            .unwrap_or(VisibilityClass::Empty)
    }

    /// The index that means "nothing here".
    #[inline]
    #[must_use]
    pub const fn empty_index(&self) -> u16 {
        self.empty_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxstream_shared::MaterialDef;

    #[test]
    fn test_classification() {
        let params = GridParameters::terrain_default().with_materials(vec![
            MaterialDef::opaque(0),
            MaterialDef::opaque(1),
            MaterialDef::translucent(2),
        ]);
        let classifier = VisibilityClassifier::new(&params);

        assert_eq!(classifier.classify(0), VisibilityClass::Empty);
        assert_eq!(classifier.classify(1), VisibilityClass::Opaque);
        assert_eq!(classifier.classify(2), VisibilityClass::Translucent);
        // Unknown indices are a boundary miss, not an error.
        assert_eq!(classifier.classify(3), VisibilityClass::Empty);
        assert_eq!(classifier.classify(u16::MAX), VisibilityClass::Empty);
    }

    #[test]
    fn test_empty_index_wins_over_blend_mode() {
        let mut params = GridParameters::terrain_default().with_materials(vec![
            MaterialDef::opaque(0),
            MaterialDef::translucent(1),
        ]);
        params.empty_material_index = 1;
        let classifier = VisibilityClassifier::new(&params);
        assert_eq!(classifier.classify(0), VisibilityClass::Opaque);
        assert_eq!(classifier.classify(1), VisibilityClass::Empty);
    }

    #[test]
    fn test_ordering() {
        assert!(VisibilityClass::Empty < VisibilityClass::Translucent);
        assert!(VisibilityClass::Translucent < VisibilityClass::Opaque);
    }
}

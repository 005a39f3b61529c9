use crate::Label;

/// A trained two-class model over fixed-length feature vectors.
///
/// Input slices always have [`BinaryClassifier::n_features`] values; the
/// [`Classifier`](crate::Classifier) adapter checks the length before
/// calling in.
///
/// # Thread Safety
///
/// Implementations must be read-only after construction and safe for
/// concurrent use.
pub trait BinaryClassifier: Send + Sync {
    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Class probabilities `[P(REAL), P(FAKE)]`, summing to 1.
    fn predict_proba(&self, features: &[f64]) -> [f64; 2];

    /// Most probable class. Ties go to REAL.
    fn predict(&self, features: &[f64]) -> Label {
        let p = self.predict_proba(features);
        if p[Label::Fake.index()] > p[Label::Real.index()] {
            Label::Fake
        } else {
            Label::Real
        }
    }
}

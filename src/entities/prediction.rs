pub const PREDICTION_NOT_IMPLEMENTED: &str = "Prediction not implemented";

const NUCLEOTIDES: &[u8] = b"ACGT";

/// True when every base is A, C, G or T (any case). An empty sequence is valid.
pub fn is_valid_dna_sequence(sequence: &str) -> bool {
    sequence
        .bytes()
        .all(|b| NUCLEOTIDES.contains(&b.to_ascii_uppercase()))
}

/// Phenotype prediction for a DNA sequence.
///
/// There is no model behind this yet, so every input yields
/// [`PREDICTION_NOT_IMPLEMENTED`]. Sequences with bases other than A, C, G
/// and T are logged but still answered.
pub fn predict(sequence: &str) -> String {
    if !is_valid_dna_sequence(sequence) {
        tracing::warn!(
            len = sequence.len(),
            "Prediction requested for a sequence with non-ACGT bases"
        );
    }
    PREDICTION_NOT_IMPLEMENTED.to_string()
}

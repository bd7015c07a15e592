//! Observation encodings for the hotel domain (spec §4.7). `Perceive` and
//! `InspectContainer` each return a bit-vector over the parts, encoded as the
//! bit-vector's integer index (`original_source`'s `getObservationIndex`);
//! `InspectObject` returns a three-valued `{ambiguous, typeA, typeB}`.

pub const OBS_AMBIGUOUS: usize = 0;
pub const OBS_TYPE_A: usize = 1;
pub const OBS_TYPE_B: usize = 2;
pub const NUM_TYPE_OBSERVATIONS: usize = 3;

/// Packs a per-part boolean vector into its bit-vector index: bit `i` is set
/// iff `bits[i]` is true.
pub fn encode_bits(bits: &[bool]) -> usize {
    bits.iter().enumerate().fold(0, |acc, (i, &b)| if b { acc | (1 << i) } else { acc })
}

pub fn decode_bits(index: usize, num_parts: usize) -> Vec<bool> {
    (0..num_parts).map(|i| index & (1 << i) != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_vector_round_trips_over_full_range() {
        let num_parts = 5;
        for index in 0..(1usize << num_parts) {
            let bits = decode_bits(index, num_parts);
            assert_eq!(encode_bits(&bits), index);
        }
    }
}

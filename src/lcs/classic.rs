//! Classical longest-common-substring dynamic programme.

use super::{prefer_forward, Substring};

/// Two-row dynamic programme over the full `(sample, reference)` grid.
///
/// Quadratic time, `O(reference window)` memory; not for large inputs. When
/// a complement buffer is supplied a second matrix tracks matches against
/// the reverse-complement strand: `complement[reference_end - j - 1]` is
/// compared against the sample character, so a diagonal chain corresponds to
/// a sample run equal to the reverse complement of a reference run.
///
/// All hits tied at the maximal length are returned; a reverse-complement
/// hit displaces forward hits only when it is strictly longer, and forward
/// hits win ties. The search stops early once the whole sample window is
/// matched on the forward strand.
#[allow(clippy::too_many_arguments)]
pub fn lcs_classic(
    reference: &[u8],
    complement: Option<&[u8]>,
    reference_start: usize,
    reference_end: usize,
    sample: &[u8],
    sample_start: usize,
    sample_end: usize,
    mask: u8,
) -> (Vec<Substring>, usize) {
    let reference_length = reference_end - reference_start;
    let sample_length = sample_end - sample_start;
    if reference_length == 0 || sample_length == 0 {
        return (Vec::new(), 0);
    }

    let mut prev = vec![0usize; reference_length];
    let mut curr = vec![0usize; reference_length];
    let mut prev_rc = vec![0usize; reference_length];
    let mut curr_rc = vec![0usize; reference_length];

    let mut hits: Vec<Substring> = Vec::new();
    let mut length = 0usize;

    for i in 0..sample_length {
        let s = sample[sample_start + i];

        for j in 0..reference_length {
            let r = reference[reference_start + j];
            if r != mask && r == s {
                let run = if j == 0 { 1 } else { prev[j - 1] + 1 };
                curr[j] = run;
                if run > length {
                    length = run;
                    hits.clear();
                    hits.push(Substring::forward(
                        reference_start + j + 1 - run,
                        sample_start + i + 1 - run,
                        run,
                    ));
                } else if run == length {
                    hits.push(Substring::forward(
                        reference_start + j + 1 - run,
                        sample_start + i + 1 - run,
                        run,
                    ));
                }
            } else {
                curr[j] = 0;
            }

            if let Some(comp) = complement {
                let c = comp[reference_end - j - 1];
                if c != mask && c == s {
                    let run = if j == 0 { 1 } else { prev_rc[j - 1] + 1 };
                    curr_rc[j] = run;
                    if run > length {
                        length = run;
                        hits.clear();
                        hits.push(Substring::reverse(
                            reference_end - j - 1,
                            sample_start + i + 1 - run,
                            run,
                        ));
                    } else if run == length {
                        hits.push(Substring::reverse(
                            reference_end - j - 1,
                            sample_start + i + 1 - run,
                            run,
                        ));
                    }
                } else {
                    curr_rc[j] = 0;
                }
            }
        }

        std::mem::swap(&mut prev, &mut curr);
        std::mem::swap(&mut prev_rc, &mut curr_rc);

        // The forward track cannot improve past a full-sample match.
        if length == sample_length && hits.iter().any(|h| !h.reverse_complement) {
            break;
        }
    }

    prefer_forward(&mut hits);
    (hits, length)
}

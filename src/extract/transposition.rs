//! Transposition extraction: describe inserted content by quoting the
//! reference instead of spelling it out.
//!
//! An inserted region that occurs verbatim (or reverse complemented)
//! anywhere in the *full* reference is cheaper to describe by its reference
//! coordinates than by its bases. This module is a reduced variant of the
//! main extractor that always searches the whole reference, splits the
//! inserted region around each match, and gives up as soon as quoting
//! costs more than writing the bases literally.

use super::{select_hit, ExtractContext, THRESHOLD_CUT_OFF, TRANSPOSITION_CUT_OFF};
use crate::lcs::longest_common_substring;
use crate::variant::{
    Variant, VariantKind, WEIGHT_BASE, WEIGHT_DELETION_INSERTION, WEIGHT_INSERTION,
    WEIGHT_INVERSION, WEIGHT_SEPARATOR,
};
use tracing::trace;

/// Base case of the main extractor for a pure insertion: emit a
/// transposition run when it undercuts the straight insertion, otherwise
/// the insertion itself.
pub(super) fn insertion(
    ctx: &ExtractContext<'_>,
    reference_start: usize,
    reference_end: usize,
    sample_start: usize,
    sample_end: usize,
    out: &mut Vec<Variant>,
) -> u64 {
    let sample_length = (sample_end - sample_start) as u64;
    let wp = ctx.weight_position;
    let weight_insertion =
        2 * wp + WEIGHT_SEPARATOR + WEIGHT_INSERTION + WEIGHT_BASE * sample_length;

    if let Some((run, run_weight)) = quote_run(ctx, reference_start, reference_end, sample_start, sample_end) {
        let framed = run_weight + 2 * wp + 3 * WEIGHT_SEPARATOR + WEIGHT_INSERTION;
        if framed < weight_insertion {
            out.extend(run);
            return framed;
        }
    }

    out.push(Variant::substitution(
        reference_start,
        reference_end,
        sample_start,
        sample_end,
        weight_insertion,
    ));
    weight_insertion
}

/// Fallback of the main extractor for an abandoned window: emit a
/// transposition-framed delins when it undercuts the trivial delins,
/// otherwise the delins itself.
pub(super) fn delins(
    ctx: &ExtractContext<'_>,
    reference_start: usize,
    reference_end: usize,
    sample_start: usize,
    sample_end: usize,
    weight_trivial: u64,
    out: &mut Vec<Variant>,
) -> u64 {
    let wp = ctx.weight_position;

    if let Some((run, run_weight)) = quote_run(ctx, reference_start, reference_end, sample_start, sample_end) {
        let framed = run_weight + 2 * wp + 3 * WEIGHT_SEPARATOR + WEIGHT_DELETION_INSERTION;
        if framed < weight_trivial {
            out.extend(run);
            return framed;
        }
    }

    out.push(Variant::substitution(
        reference_start,
        reference_end,
        sample_start,
        sample_end,
        weight_trivial,
    ));
    weight_trivial
}

/// Try to describe `sample[sample_start..sample_end)` as a run of reference
/// quotes and literal pieces.
///
/// Returns `None` when quoting is not applicable: no complement (transposed
/// inversions only make sense for DNA), nothing quotable found, or the run
/// exceeds the budget of writing the bases out literally.
fn quote_run(
    ctx: &ExtractContext<'_>,
    reference_start: usize,
    reference_end: usize,
    sample_start: usize,
    sample_end: usize,
) -> Option<(Vec<Variant>, u64)> {
    ctx.complement?;

    let budget = WEIGHT_BASE * (sample_end - sample_start) as u64;
    let mut run = Vec::new();
    let weight = quote(ctx, sample_start, sample_end, reference_start, &mut run);
    if weight > budget {
        trace!(weight, budget, "transposition over budget");
        return None;
    }
    if !run.iter().any(|member| member.is_transposition()) {
        return None;
    }

    // Decorate the run: the closing member carries the replaced reference
    // window so the run tiles it.
    if let Some(first) = run.first_mut() {
        first.kind |= VariantKind::TRANSPOSITION_OPEN;
    }
    if let Some(last) = run.last_mut() {
        last.kind |= VariantKind::TRANSPOSITION_CLOSE;
        last.reference_end = reference_end;
    }
    Some((run, weight))
}

/// Recursively split the sample window around matches against the whole
/// reference. Every member is anchored at `anchor` on the reference side;
/// quoted members carry the source region in their transposition fields.
fn quote(
    ctx: &ExtractContext<'_>,
    sample_start: usize,
    sample_end: usize,
    anchor: usize,
    out: &mut Vec<Variant>,
) -> u64 {
    let sample_length = sample_end - sample_start;
    if sample_length == 0 {
        return 0;
    }
    let wp = ctx.weight_position;
    let literal_weight = WEIGHT_BASE * sample_length as u64;

    // Below this size a quote cannot beat spelling the bases out.
    if sample_length < 2 * wp as usize + 1 {
        out.push(Variant::substitution(
            anchor,
            anchor,
            sample_start,
            sample_end,
            literal_weight,
        ));
        return literal_weight;
    }

    let cut_off = if ctx.reference_length >= THRESHOLD_CUT_OFF {
        wp as usize
    } else {
        1
    };
    let (hits, length) = longest_common_substring(
        ctx.reference,
        ctx.complement,
        0,
        ctx.reference_length,
        ctx.sample,
        sample_start,
        sample_end,
        cut_off,
        ctx.mask,
    );

    let too_short = (length as f64) < sample_length as f64 * TRANSPOSITION_CUT_OFF;
    if length == 0 || hits.is_empty() || too_short {
        out.push(Variant::substitution(
            anchor,
            anchor,
            sample_start,
            sample_end,
            literal_weight,
        ));
        return literal_weight;
    }

    let lcs = select_hit(&hits, 0, ctx.reference_length, sample_start, sample_end);
    let quote_weight = if lcs.reverse_complement {
        2 * wp + WEIGHT_SEPARATOR + WEIGHT_INVERSION
    } else {
        2 * wp + WEIGHT_SEPARATOR
    };

    let mut weight = quote(ctx, sample_start, lcs.sample_index, anchor, out);
    out.push(Variant::transposed(
        anchor,
        lcs.sample_index,
        lcs.sample_index + lcs.length,
        lcs.reference_index,
        lcs.reference_index + lcs.length,
        lcs.reverse_complement,
        quote_weight,
    ));
    weight += quote_weight;
    weight += quote(ctx, lcs.sample_index + lcs.length, sample_end, anchor, out);
    weight
}

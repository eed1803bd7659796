//! Proof verification pipeline.

use tracing::{event, Level};

use crate::air::composition::{self, draw_coefficients};
use crate::air::context::EvaluationContext;
use crate::air::trace::validate_aux_patterns;
use crate::air::{validate_assertions, Air, Assertion};
use crate::fft::interpolate_roots;
use crate::field::{polynomial, StarkField};
use crate::fri::{self, num_layers, FriError, FriVerifierParams, FOLDING_FACTOR};
use crate::merkle::verify_batch;
use crate::transcript::{Transcript, TranscriptLabel};

use super::errors::VerifyError;
use super::proof::Proof;
use super::{augmented_positions, lc_positions, Stark};

pub(super) fn verify<F: StarkField, A: Air<F>>(
    stark: &Stark<F, A>,
    assertions: &[Assertion<F>],
    proof: &Proof<F>,
    public_aux: &[Vec<F>],
) -> Result<(), VerifyError> {
    let counts = stark.counts();

    // recover the trace length from the committed shape
    let shape = &proof.trace_shape;
    if shape.depth() != stark.air.loop_depth() {
        return Err(VerifyError::Structure {
            what: "trace shape depth",
        });
    }
    if shape.0.iter().any(|&count| count == 0) {
        return Err(VerifyError::Structure {
            what: "trace shape count",
        });
    }
    for window in shape.0.windows(2) {
        if window[1] < window[0] {
            return Err(VerifyError::Structure {
                what: "trace shape nesting",
            });
        }
    }
    let trace_length = stark
        .air
        .steps_per_segment()
        .checked_mul(shape.total_segments())
        .ok_or(VerifyError::Structure {
            what: "trace length overflow",
        })?;

    let context = EvaluationContext::<F>::new(
        trace_length,
        stark.extension_factor,
        stark.air.constraint_degrees(),
    )?;
    validate_assertions(&counts, trace_length, assertions)?;
    validate_aux_patterns(public_aux, counts.public, trace_length)?;

    let n = context.evaluation_domain_size();
    let k2 = context.extension_factor();
    let quarter = n / FOLDING_FACTOR;
    let layer_count = num_layers(n);
    if proof.fri.layers.len() != layer_count {
        return Err(VerifyError::Fri(FriError::LayerCountMismatch {
            expected: layer_count,
            got: proof.fri.layers.len(),
        }));
    }

    // transcript replay
    let mut transcript = Transcript::new(stark.hash, &stark.parameter_bytes());
    transcript.absorb(
        TranscriptLabel::PublicInputs,
        &stark.public_input_digest(assertions, public_aux, shape),
    )?;
    transcript.absorb_digest(TranscriptLabel::TraceRoot, &proof.ev_root)?;

    let boundary_groups = crate::air::boundary::group_assertions(&context, assertions);
    let coefficients = draw_coefficients(&context, &boundary_groups, &mut transcript)?;

    transcript.absorb_digest(TranscriptLabel::CompositionRoot, &proof.lc_root)?;
    let mut fold_challenges = Vec::with_capacity(layer_count);
    for layer in 0..layer_count {
        fold_challenges
            .push(transcript.challenge_felt::<F>(TranscriptLabel::FriFoldChallenge(layer as u8))?);
        transcript.absorb_digest(
            TranscriptLabel::FriLayerRoot(layer as u8),
            &proof.fri.layers[layer].column_root,
        )?;
    }
    let exe_positions =
        transcript.challenge_positions(TranscriptLabel::ExeQuerySeed, stark.exe_query_count, n, k2)?;
    let fri_positions = transcript.challenge_positions(
        TranscriptLabel::FriQuerySeed,
        stark.fri_query_count,
        quarter,
        k2,
    )?;

    // trace openings at the spot-check positions and their next-row
    // companions
    let augmented = augmented_positions(&exe_positions, k2, n);
    verify_batch(stark.hash, &proof.ev_root, &augmented, &proof.ev_proof, n)
        .map_err(|_| VerifyError::TraceCommitment)?;
    let trace_rows = parse_trace_rows::<F>(&proof.ev_proof.values, counts.committed())?;

    // composition openings covering the same positions
    let lc_indices = lc_positions(&exe_positions, quarter);
    verify_batch(
        stark.hash,
        &proof.lc_root,
        &lc_indices,
        &proof.lc_proof,
        quarter,
    )
    .map_err(|_| VerifyError::CompositionCommitment)?;
    let lc_rows = parse_quartic_rows::<F>(&proof.lc_proof.values)?;

    // public readonly registers are re-derived from their cyclic patterns:
    // a pattern of length m lifts to P(x) = q(x^(T/m)) with q interpolating
    // the pattern over the order-m subgroup
    let pattern_polynomials: Vec<(Vec<F>, u128)> = public_aux
        .iter()
        .map(|pattern| {
            let coefficients = if pattern.len() == 1 {
                pattern.clone()
            } else {
                interpolate_roots(pattern, F::root_of_unity(pattern.len().trailing_zeros()))
            };
            (coefficients, (trace_length / pattern.len()) as u128)
        })
        .collect();

    // recompute the composition at every spot-check position
    for &position in &exe_positions {
        let x = context.x_at(position);
        let row = row_at(&augmented, &trace_rows, position);
        let next_row = row_at(&augmented, &trace_rows, (position + k2) % n);
        let current = &row[..counts.state];
        let next = &next_row[..counts.state];

        let mut readonly = Vec::with_capacity(counts.readonly());
        readonly.extend_from_slice(&row[counts.state..counts.state + counts.input]);
        for (coefficients, exponent) in &pattern_polynomials {
            readonly.push(polynomial::eval_at(coefficients, x.exp(*exponent)));
        }
        readonly.extend_from_slice(&row[counts.state + counts.input..]);

        let expected = composition::evaluate_at(
            &context,
            &stark.air,
            x,
            current,
            next,
            &readonly,
            &boundary_groups,
            &coefficients,
        )
        .map_err(|_| VerifyError::Structure {
            what: "query position on trace domain",
        })?;

        let leaf = lc_indices
            .binary_search(&(position % quarter))
            .map_err(|_| VerifyError::Structure {
                what: "composition opening coverage",
            })?;
        let committed = lc_rows[leaf][position / quarter];
        if expected != committed {
            event!(Level::DEBUG, position, "composition reconstruction mismatch");
            return Err(VerifyError::CompositionMismatch { position });
        }
    }

    // low-degree argument over the composition commitment
    fri::verify(
        &proof.fri,
        proof.lc_root,
        &fold_challenges,
        &fri_positions,
        context.omega(),
        &FriVerifierParams {
            domain_size: n,
            max_degree: context.composition_degree(),
            exclude_multiples_of: k2,
            algorithm: stark.hash,
        },
    )?;
    Ok(())
}

fn parse_trace_rows<F: StarkField>(
    blobs: &[Vec<u8>],
    width: usize,
) -> Result<Vec<Vec<F>>, VerifyError> {
    blobs
        .iter()
        .map(|blob| {
            if blob.len() != width * F::ELEMENT_BYTES {
                return Err(VerifyError::MalformedLeaf);
            }
            blob.chunks(F::ELEMENT_BYTES)
                .map(|chunk| F::from_be_slice(chunk).ok_or(VerifyError::MalformedLeaf))
                .collect()
        })
        .collect()
}

fn parse_quartic_rows<F: StarkField>(blobs: &[Vec<u8>]) -> Result<Vec<[F; 4]>, VerifyError> {
    blobs
        .iter()
        .map(|blob| {
            if blob.len() != FOLDING_FACTOR * F::ELEMENT_BYTES {
                return Err(VerifyError::MalformedLeaf);
            }
            let mut row = [F::ZERO; 4];
            for (slot, chunk) in row.iter_mut().zip(blob.chunks(F::ELEMENT_BYTES)) {
                *slot = F::from_be_slice(chunk).ok_or(VerifyError::MalformedLeaf)?;
            }
            Ok(row)
        })
        .collect()
}

fn row_at<'a, F>(positions: &[usize], rows: &'a [Vec<F>], position: usize) -> &'a [F] {
    let index = positions
        .binary_search(&position)
        .expect("augmented positions cover every queried row");
    &rows[index]
}

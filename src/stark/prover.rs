//! Proof generation pipeline.

use tracing::{event, info_span, Level};

use crate::air::boundary::group_assertions;
use crate::air::composition::{draw_coefficients, evaluate_over_domain};
use crate::air::context::EvaluationContext;
use crate::air::trace::{build_trace, validate_transitions};
use crate::air::{validate_assertions, Air, Assertion, InputTree};
use crate::fft::lde::{extend_registers, interpolate_registers};
use crate::field::StarkField;
use crate::fri::{self, to_quartic_leaves, FOLDING_FACTOR};
use crate::merkle::MerkleTree;
use crate::transcript::{Transcript, TranscriptLabel};
use crate::utils;

use super::errors::ProverError;
use super::proof::Proof;
use super::{augmented_positions, lc_positions, Stark};

pub(super) fn prove<F: StarkField, A: Air<F>>(
    stark: &Stark<F, A>,
    assertions: &[Assertion<F>],
    inputs: &InputTree<F>,
    public_aux: &[Vec<F>],
    secret_aux: &[Vec<F>],
) -> Result<Proof<F>, ProverError> {
    let span = info_span!("build_trace").entered();
    let (trace, trace_shape) = build_trace(&stark.air, inputs, public_aux, secret_aux)?;
    let trace_length = trace.length();
    drop(span);

    let context = EvaluationContext::<F>::new(
        trace_length,
        stark.extension_factor,
        stark.air.constraint_degrees(),
    )?;
    validate_assertions(trace.counts(), trace_length, assertions)?;
    validate_transitions(&stark.air, &trace).map_err(ProverError::Unsatisfied)?;
    for assertion in assertions {
        if trace.get(assertion.register, assertion.step) != assertion.value {
            return Err(ProverError::AssertionViolation {
                register: assertion.register,
                step: assertion.step,
            });
        }
    }

    let n = context.evaluation_domain_size();
    let span = info_span!("extend_trace", registers = trace.counts().total(), domain = n).entered();
    let polynomials = interpolate_registers(trace.registers(), context.trace_generator());
    let trace_evaluations = extend_registers(&polynomials, context.omega(), n);
    drop(span);

    let span = info_span!("commit_to_trace").entered();
    let committed_rows = stark.committed_row_indices();
    let leaf_width = stark.ev_leaf_width();
    let ev_leaves: Vec<Vec<u8>> = utils::collect_indexed(n, |position| {
        let mut blob = Vec::with_capacity(leaf_width);
        for &row in &committed_rows {
            trace_evaluations[row][position].write_be(&mut blob);
        }
        blob
    });
    let ev_tree = MerkleTree::build(stark.hash, &ev_leaves)?;
    let ev_root = ev_tree.root();
    drop(span);

    let mut transcript = Transcript::new(stark.hash, &stark.parameter_bytes());
    transcript.absorb(
        TranscriptLabel::PublicInputs,
        &stark.public_input_digest(assertions, public_aux, &trace_shape),
    )?;
    transcript.absorb_digest(TranscriptLabel::TraceRoot, &ev_root)?;

    let boundary_groups = group_assertions(&context, assertions);
    let coefficients = draw_coefficients(&context, &boundary_groups, &mut transcript)?;

    let span = info_span!("evaluate_composition").entered();
    let domain = context.build_evaluation_domain();
    let composition = evaluate_over_domain(
        &context,
        &stark.air,
        &trace_evaluations,
        &domain,
        &boundary_groups,
        &coefficients,
    );
    drop(span);

    let lc_leaves = to_quartic_leaves(&composition);
    let lc_tree = MerkleTree::build(stark.hash, &lc_leaves)?;
    let lc_root = lc_tree.root();
    transcript.absorb_digest(TranscriptLabel::CompositionRoot, &lc_root)?;

    let span = info_span!("fri_commit").entered();
    let commitment = fri::commit(
        composition,
        lc_leaves,
        lc_tree,
        context.omega(),
        context.composition_degree(),
        context.extension_factor(),
        stark.hash,
        &mut transcript,
    )?;
    drop(span);

    let exe_positions = transcript.challenge_positions(
        TranscriptLabel::ExeQuerySeed,
        stark.exe_query_count,
        n,
        context.extension_factor(),
    )?;
    let fri_positions = transcript.challenge_positions(
        TranscriptLabel::FriQuerySeed,
        stark.fri_query_count,
        commitment.first_layer_rows(),
        context.extension_factor(),
    )?;

    let augmented = augmented_positions(&exe_positions, context.extension_factor(), n);
    let ev_proof = ev_tree.prove_batch(&augmented, &ev_leaves)?;
    let lc_indices = lc_positions(&exe_positions, n / FOLDING_FACTOR);
    let lc_proof = commitment.prove_first_layer(&lc_indices)?;
    let fri_proof = fri::open(&commitment, &fri_positions)?;

    let proof = Proof {
        ev_root,
        ev_proof,
        lc_root,
        lc_proof,
        fri: fri_proof,
        trace_shape,
    };
    event!(
        Level::DEBUG,
        trace_length,
        proof_size = proof.size_in_bytes(),
        "proof assembled"
    );
    Ok(proof)
}

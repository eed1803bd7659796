//! Standalone FRI prove/verify round-trips.

use airstark::fft::evaluate_poly;
use airstark::field::{F64, StarkField};
use airstark::fri::{self, to_quartic_leaves, FriVerifierParams};
use airstark::hash::HashAlgorithm;
use airstark::merkle::MerkleTree;
use airstark::transcript::{Transcript, TranscriptLabel};

const DOMAIN_LOG2: u32 = 10;
const DOMAIN_SIZE: usize = 1 << DOMAIN_LOG2;
const MAX_DEGREE: usize = 60;
const ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// drives a fresh transcript to the state where FRI folding begins
fn transcript_at_composition(root: &[u8; 32]) -> Transcript {
    let mut transcript = Transcript::new(ALGORITHM, b"fri-end-to-end");
    transcript
        .absorb(TranscriptLabel::PublicInputs, b"fri")
        .unwrap();
    transcript
        .absorb_digest(TranscriptLabel::TraceRoot, &[9u8; 32])
        .unwrap();
    let _: Vec<F64> = transcript
        .challenge_felts(TranscriptLabel::ConstraintCoefficients, 1)
        .unwrap();
    transcript.absorb_digest(TranscriptLabel::CompositionRoot, root).unwrap();
    transcript
}

fn codeword(degree: usize) -> Vec<F64> {
    let coefficients: Vec<F64> = (0..=degree as u64)
        .map(|i| F64::from_u64(i * 7 + 13))
        .collect();
    evaluate_poly(&coefficients, F64::root_of_unity(DOMAIN_LOG2), DOMAIN_SIZE)
}

#[test]
fn low_degree_codeword_passes() {
    let values = codeword(MAX_DEGREE);
    let leaves = to_quartic_leaves(&values);
    let tree = MerkleTree::build(ALGORITHM, &leaves).unwrap();
    let root = tree.root();

    let mut transcript = transcript_at_composition(&root);
    let omega = F64::root_of_unity(DOMAIN_LOG2);
    let commitment = fri::commit(
        values,
        leaves,
        tree,
        omega,
        MAX_DEGREE,
        0,
        ALGORITHM,
        &mut transcript,
    )
    .unwrap();

    let _ = transcript
        .challenge_positions(TranscriptLabel::ExeQuerySeed, 10, DOMAIN_SIZE, 0)
        .unwrap();
    let fri_positions = transcript
        .challenge_positions(TranscriptLabel::FriQuerySeed, 16, DOMAIN_SIZE / 4, 0)
        .unwrap();
    let proof = fri::open(&commitment, &fri_positions).unwrap();
    assert_eq!(proof.layers.len(), 1);

    // replay the transcript to recover the fold challenges
    let mut replay = transcript_at_composition(&root);
    let mut challenges = Vec::new();
    for (layer, layer_proof) in proof.layers.iter().enumerate() {
        challenges.push(
            replay
                .challenge_felt::<F64>(TranscriptLabel::FriFoldChallenge(layer as u8))
                .unwrap(),
        );
        replay
            .absorb_digest(TranscriptLabel::FriLayerRoot(layer as u8), &layer_proof.column_root)
            .unwrap();
    }
    let _ = replay
        .challenge_positions(TranscriptLabel::ExeQuerySeed, 10, DOMAIN_SIZE, 0)
        .unwrap();
    let replayed_positions = replay
        .challenge_positions(TranscriptLabel::FriQuerySeed, 16, DOMAIN_SIZE / 4, 0)
        .unwrap();
    assert_eq!(replayed_positions, fri_positions);

    fri::verify(
        &proof,
        root,
        &challenges,
        &fri_positions,
        F64::root_of_unity(DOMAIN_LOG2),
        &FriVerifierParams {
            domain_size: DOMAIN_SIZE,
            max_degree: MAX_DEGREE,
            exclude_multiples_of: 0,
            algorithm: ALGORITHM,
        },
    )
    .unwrap();
}

#[test]
fn high_degree_codeword_is_refused_by_the_prover() {
    // degree 3 * MAX_DEGREE cannot survive the remainder check
    let values = codeword(3 * MAX_DEGREE);
    let leaves = to_quartic_leaves(&values);
    let tree = MerkleTree::build(ALGORITHM, &leaves).unwrap();
    let root = tree.root();
    let mut transcript = transcript_at_composition(&root);
    let result = fri::commit(
        values,
        leaves,
        tree,
        F64::root_of_unity(DOMAIN_LOG2),
        MAX_DEGREE,
        0,
        ALGORITHM,
        &mut transcript,
    );
    assert!(matches!(result.err(), Some(fri::FriError::DegreeExceeded)));
}

#[test]
fn tampered_remainder_is_rejected() {
    let values = codeword(MAX_DEGREE);
    let leaves = to_quartic_leaves(&values);
    let tree = MerkleTree::build(ALGORITHM, &leaves).unwrap();
    let root = tree.root();
    let mut transcript = transcript_at_composition(&root);
    let omega = F64::root_of_unity(DOMAIN_LOG2);
    let commitment = fri::commit(
        values, leaves, tree, omega, MAX_DEGREE, 0, ALGORITHM, &mut transcript,
    )
    .unwrap();
    let fri_positions = vec![1usize, 17, 63];
    let mut proof = fri::open(&commitment, &fri_positions).unwrap();
    proof.remainder[5] = proof.remainder[5] + F64::ONE;

    let mut replay = transcript_at_composition(&root);
    let challenge = replay
        .challenge_felt::<F64>(TranscriptLabel::FriFoldChallenge(0))
        .unwrap();
    let result = fri::verify(
        &proof,
        root,
        &[challenge],
        &fri_positions,
        omega,
        &FriVerifierParams {
            domain_size: DOMAIN_SIZE,
            max_degree: MAX_DEGREE,
            exclude_multiples_of: 0,
            algorithm: ALGORITHM,
        },
    );
    assert!(matches!(
        result.err(),
        Some(fri::FriError::RemainderCommitment)
    ));
}

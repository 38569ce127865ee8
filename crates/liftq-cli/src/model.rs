//! Model artifact persistence.
//!
//! A trained approximator is persisted as a *pair* of artifacts: a JSON
//! descriptor (`*.model.json`) carrying the topology and training metadata,
//! and a raw parameter blob (`*.model.weights.bin`) of little-endian `f32`s
//! in the network's export order. Loading requires exactly one file of each
//! kind; anything else is a [`ConfigurationError`], which callers recover
//! from by falling back to a freshly initialized network.

use std::{
    fs,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use liftq_agent::{PreconditionViolation, Topology, ValueNetwork};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DESCRIPTOR_SUFFIX: &str = ".model.json";
pub const WEIGHTS_SUFFIX: &str = ".model.weights.bin";

/// Metadata persisted alongside a trained parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub floor_count: usize,
    pub elevator_count: usize,
    pub topology: Topology,
    pub episodes_trained: usize,
    pub final_explore_rate: f32,
    pub mean_episode_reward: f32,
}

/// Malformed or incomplete persisted model artifacts.
///
/// Recovered locally: the caller reports the error and trains from scratch
/// instead of crashing.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    #[display("expected exactly one '*{DESCRIPTOR_SUFFIX}' artifact, got {got}")]
    DescriptorCount { got: usize },
    #[display("expected exactly one '*{WEIGHTS_SUFFIX}' artifact, got {got}")]
    WeightsCount { got: usize },
    #[display("unrecognized model artifact: {path}")]
    UnknownArtifact { path: String },
    #[display("failed to read model descriptor {path}: {reason}")]
    UnreadableDescriptor { path: String, reason: String },
    #[display("failed to read weights blob {path}: {reason}")]
    UnreadableBlob { path: String, reason: String },
    #[display("weights blob {path} holds {bytes} bytes, not a whole number of 32-bit values")]
    MalformedBlob { path: String, bytes: usize },
    #[display(
        "model was trained for {model_floors} floors x {model_elevators} elevators, \
         this world has {floors} x {elevators}"
    )]
    ShapeMismatch {
        model_floors: usize,
        model_elevators: usize,
        floors: usize,
        elevators: usize,
    },
    #[display(
        "model topology ({input_len} inputs, {output_len} outputs) does not fit this world \
         ({expected_inputs} inputs, {expected_outputs} outputs)"
    )]
    TopologyMismatch {
        input_len: usize,
        output_len: usize,
        expected_inputs: usize,
        expected_outputs: usize,
    },
    #[display("parameter blob does not fit the descriptor topology: {source}")]
    ParameterMismatch { source: PreconditionViolation },
}

/// Export base name encoding the world shape and the training instant.
#[must_use]
pub fn export_name(floor_count: usize, elevator_count: usize, trained_at: DateTime<Utc>) -> String {
    format!(
        "agent-F{floor_count}E{elevator_count}-{}",
        trained_at.format("%Y%m%d%H%M%S")
    )
}

/// Reads and validates a descriptor/weights artifact pair.
pub fn load_pair(paths: &[PathBuf]) -> Result<(ModelDescriptor, Vec<f32>), ConfigurationError> {
    let mut descriptors = vec![];
    let mut blobs = vec![];
    for path in paths {
        let name = path.to_string_lossy();
        if name.ends_with(DESCRIPTOR_SUFFIX) {
            descriptors.push(path);
        } else if name.ends_with(WEIGHTS_SUFFIX) {
            blobs.push(path);
        } else {
            return Err(ConfigurationError::UnknownArtifact {
                path: path.display().to_string(),
            });
        }
    }
    let &[descriptor_path] = descriptors.as_slice() else {
        return Err(ConfigurationError::DescriptorCount {
            got: descriptors.len(),
        });
    };
    let &[blob_path] = blobs.as_slice() else {
        return Err(ConfigurationError::WeightsCount { got: blobs.len() });
    };

    let descriptor_file =
        fs::File::open(descriptor_path).map_err(|e| ConfigurationError::UnreadableDescriptor {
            path: descriptor_path.display().to_string(),
            reason: e.to_string(),
        })?;
    let descriptor: ModelDescriptor = serde_json::from_reader(BufReader::new(descriptor_file))
        .map_err(|e| ConfigurationError::UnreadableDescriptor {
            path: descriptor_path.display().to_string(),
            reason: e.to_string(),
        })?;

    let bytes = fs::read(blob_path).map_err(|e| ConfigurationError::UnreadableBlob {
        path: blob_path.display().to_string(),
        reason: e.to_string(),
    })?;
    if bytes.len() % 4 != 0 {
        return Err(ConfigurationError::MalformedBlob {
            path: blob_path.display().to_string(),
            bytes: bytes.len(),
        });
    }
    let params = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().expect("chunks are 4 bytes")))
        .collect();

    Ok((descriptor, params))
}

/// Rebuilds a network from a loaded pair, validating it against the world
/// shape it is about to drive.
pub fn network_from_pair(
    descriptor: &ModelDescriptor,
    params: &[f32],
    floor_count: usize,
    elevator_count: usize,
    input_len: usize,
    action_count: usize,
    learning_rate: f32,
) -> Result<ValueNetwork, ConfigurationError> {
    if descriptor.floor_count != floor_count || descriptor.elevator_count != elevator_count {
        return Err(ConfigurationError::ShapeMismatch {
            model_floors: descriptor.floor_count,
            model_elevators: descriptor.elevator_count,
            floors: floor_count,
            elevators: elevator_count,
        });
    }
    if descriptor.topology.input_len != input_len || descriptor.topology.output_len != action_count
    {
        return Err(ConfigurationError::TopologyMismatch {
            input_len: descriptor.topology.input_len,
            output_len: descriptor.topology.output_len,
            expected_inputs: input_len,
            expected_outputs: action_count,
        });
    }
    ValueNetwork::from_params(descriptor.topology.clone(), learning_rate, params)
        .map_err(|source| ConfigurationError::ParameterMismatch { source })
}

/// Loads a network from the given artifact paths, or initializes a fresh one.
///
/// An empty path list means "train from scratch" and is silent; a present but
/// unloadable pair is reported and degraded to a fresh network.
pub fn load_or_fresh<R>(
    paths: &[PathBuf],
    floor_count: usize,
    elevator_count: usize,
    input_len: usize,
    action_count: usize,
    learning_rate: f32,
    rng: &mut R,
) -> (ValueNetwork, Option<ModelDescriptor>)
where
    R: Rng + ?Sized,
{
    let fresh = |rng: &mut R| {
        ValueNetwork::new(Topology::scaled(input_len, action_count), learning_rate, rng)
    };
    if paths.is_empty() {
        return (fresh(rng), None);
    }
    let loaded = load_pair(paths).and_then(|(descriptor, params)| {
        network_from_pair(
            &descriptor,
            &params,
            floor_count,
            elevator_count,
            input_len,
            action_count,
            learning_rate,
        )
        .map(|network| (network, descriptor))
    });
    match loaded {
        Ok((network, descriptor)) => {
            eprintln!("Loaded model '{}' (trained {})", descriptor.name, descriptor.trained_at);
            (network, Some(descriptor))
        }
        Err(err) => {
            eprintln!("Could not load model artifacts: {err}");
            eprintln!("Falling back to a freshly initialized network.");
            (fresh(rng), None)
        }
    }
}

/// Writes the artifact pair into `dir`, returning both paths.
pub fn save(
    dir: &Path,
    descriptor: &ModelDescriptor,
    params: &[f32],
) -> anyhow::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let descriptor_path = dir.join(format!("{}{DESCRIPTOR_SUFFIX}", descriptor.name));
    let json = serde_json::to_string_pretty(descriptor).context("Failed to serialize model descriptor")?;
    fs::write(&descriptor_path, json).with_context(|| {
        format!(
            "Failed to write model descriptor: {}",
            descriptor_path.display()
        )
    })?;

    let weights_path = dir.join(format!("{}{WEIGHTS_SUFFIX}", descriptor.name));
    let mut bytes = Vec::with_capacity(params.len() * 4);
    for value in params {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(&weights_path, bytes)
        .with_context(|| format!("Failed to write weights blob: {}", weights_path.display()))?;

    Ok((descriptor_path, weights_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ModelDescriptor {
        ModelDescriptor {
            name: name.to_owned(),
            trained_at: Utc::now(),
            floor_count: 4,
            elevator_count: 1,
            topology: Topology {
                input_len: 3,
                hidden: vec![],
                output_len: 2,
            },
            episodes_trained: 10,
            final_explore_rate: 0.25,
            mean_episode_reward: -12.5,
        }
    }

    fn scratch_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("liftq-model-{test}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn export_name_encodes_shape_and_timestamp() {
        let at = DateTime::parse_from_rfc3339("2024-05-04T03:02:01Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(export_name(6, 1, at), "agent-F6E1-20240504030201");
    }

    #[test]
    fn saved_pair_round_trips() {
        let dir = scratch_dir("roundtrip");
        let descriptor = descriptor("agent-F4E1-roundtrip");
        let params = vec![1.0, -2.5, 0.0, 3.25, -0.5, 42.0, 0.125, -8.0];
        let (descriptor_path, weights_path) = save(&dir, &descriptor, &params).unwrap();

        let (loaded, loaded_params) = load_pair(&[descriptor_path, weights_path]).unwrap();
        assert_eq!(loaded.name, descriptor.name);
        assert_eq!(loaded.topology, descriptor.topology);
        assert_eq!(loaded_params, params);

        let network = network_from_pair(&loaded, &loaded_params, 4, 1, 3, 2, 0.01).unwrap();
        assert_eq!(network.params(), params);
    }

    #[test]
    fn missing_or_extra_artifacts_are_rejected() {
        let dir = scratch_dir("counts");
        let descriptor = descriptor("agent-F4E1-counts");
        let params = vec![0.0; 8];
        let (descriptor_path, weights_path) = save(&dir, &descriptor, &params).unwrap();

        assert!(matches!(
            load_pair(&[descriptor_path.clone()]),
            Err(ConfigurationError::WeightsCount { got: 0 })
        ));
        assert!(matches!(
            load_pair(&[weights_path.clone()]),
            Err(ConfigurationError::DescriptorCount { got: 0 })
        ));
        assert!(matches!(
            load_pair(&[descriptor_path.clone(), weights_path.clone(), weights_path]),
            Err(ConfigurationError::WeightsCount { got: 2 })
        ));
        assert!(matches!(
            load_pair(&[descriptor_path, PathBuf::from("notes.txt")]),
            Err(ConfigurationError::UnknownArtifact { .. })
        ));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let dir = scratch_dir("truncated");
        let descriptor = descriptor("agent-F4E1-truncated");
        let (descriptor_path, weights_path) = save(&dir, &descriptor, &[1.0, 2.0]).unwrap();
        let mut bytes = fs::read(&weights_path).unwrap();
        bytes.pop();
        fs::write(&weights_path, bytes).unwrap();

        assert!(matches!(
            load_pair(&[descriptor_path, weights_path]),
            Err(ConfigurationError::MalformedBlob { bytes: 7, .. })
        ));
    }

    #[test]
    fn mismatched_world_shape_is_rejected() {
        let descriptor = descriptor("agent-F4E1-shape");
        let params = vec![0.0; descriptor.topology.parameter_count()];
        assert!(matches!(
            network_from_pair(&descriptor, &params, 6, 1, 3, 2, 0.01),
            Err(ConfigurationError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            network_from_pair(&descriptor, &params, 4, 1, 5, 2, 0.01),
            Err(ConfigurationError::TopologyMismatch { .. })
        ));
        assert!(matches!(
            network_from_pair(&descriptor, &params[..3], 4, 1, 3, 2, 0.01),
            Err(ConfigurationError::ParameterMismatch { .. })
        ));
    }
}

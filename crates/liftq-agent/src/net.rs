//! Feed-forward action-value approximator.
//!
//! A stack of fully connected layers with a leaky-rectifying activation
//! between hidden layers and a linear head producing one predicted return per
//! action. Training is one batch-averaged SGD step on mean squared error per
//! call; the trainer decides when and with what targets.
//!
//! Parameters are opaque outside this module: they leave and re-enter only as
//! a flat `Vec<f32>` (per layer: weights row-major, then biases) paired with
//! the [`Topology`] that shaped them.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::{error::PreconditionViolation, observation::Observation};

/// Negative-side slope of the leaky rectifier.
const LEAKY_SLOPE: f32 = 0.01;

/// Shape descriptor for a [`ValueNetwork`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub input_len: usize,
    pub hidden: Vec<usize>,
    pub output_len: usize,
}

impl Topology {
    /// Default topology for a given observation length and action count:
    /// hidden widths scale with the input size.
    #[must_use]
    pub fn scaled(input_len: usize, action_count: usize) -> Self {
        Self {
            input_len,
            hidden: vec![input_len, 3 * action_count],
            output_len: action_count,
        }
    }

    /// Total number of parameters (weights and biases) of this shape.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layer_dims()
            .into_iter()
            .map(|(fan_in, fan_out)| fan_in * fan_out + fan_out)
            .sum()
    }

    fn layer_dims(&self) -> Vec<(usize, usize)> {
        let mut dims = Vec::with_capacity(self.hidden.len() + 1);
        let mut prev = self.input_len;
        for &width in &self.hidden {
            dims.push((prev, width));
            prev = width;
        }
        dims.push((prev, self.output_len));
        dims
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    /// `(fan_in, fan_out)`; an input row vector is multiplied from the left.
    weights: Array2<f32>,
    biases: Array1<f32>,
}

fn leaky(x: f32) -> f32 {
    if x > 0.0 { x } else { LEAKY_SLOPE * x }
}

fn leaky_derivative(x: f32) -> f32 {
    if x > 0.0 { 1.0 } else { LEAKY_SLOPE }
}

/// The online action-value network.
///
/// Single-writer discipline: only the trainer's fit step mutates parameters;
/// the target network keeps its own independently owned copy.
#[derive(Debug, Clone)]
pub struct ValueNetwork {
    topology: Topology,
    layers: Vec<DenseLayer>,
    learning_rate: f32,
}

impl ValueNetwork {
    /// Fresh network with He-initialized weights and zero biases.
    ///
    /// # Panics
    ///
    /// Panics if the topology has a zero-width layer or the learning rate is
    /// not positive.
    #[must_use]
    pub fn new<R>(topology: Topology, learning_rate: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(topology.input_len > 0 && topology.output_len > 0);
        assert!(topology.hidden.iter().all(|&w| w > 0));
        assert!(learning_rate > 0.0);

        let layers = topology
            .layer_dims()
            .into_iter()
            .map(|(fan_in, fan_out)| {
                #[expect(clippy::cast_precision_loss)]
                let std_dev = (2.0 / fan_in as f32).sqrt();
                let normal = Normal::new(0.0, std_dev).unwrap();
                DenseLayer {
                    weights: Array2::from_shape_fn((fan_in, fan_out), |_| rng.sample(normal)),
                    biases: Array1::zeros(fan_out),
                }
            })
            .collect();
        Self {
            topology,
            layers,
            learning_rate,
        }
    }

    /// Rebuilds a network from a previously exported parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::ParameterCount`] if `params` does not
    /// hold exactly the number of values the topology requires.
    pub fn from_params(
        topology: Topology,
        learning_rate: f32,
        params: &[f32],
    ) -> Result<Self, PreconditionViolation> {
        let expected = topology.parameter_count();
        if params.len() != expected {
            return Err(PreconditionViolation::ParameterCount {
                expected,
                got: params.len(),
            });
        }

        let mut rest = params;
        let layers = topology
            .layer_dims()
            .into_iter()
            .map(|(fan_in, fan_out)| {
                let (weight_chunk, after_weights) = rest.split_at(fan_in * fan_out);
                let (bias_chunk, after_biases) = after_weights.split_at(fan_out);
                rest = after_biases;
                DenseLayer {
                    weights: Array2::from_shape_vec((fan_in, fan_out), weight_chunk.to_vec())
                        .expect("chunk length matches layer shape"),
                    biases: Array1::from_vec(bias_chunk.to_vec()),
                }
            })
            .collect();
        Ok(Self {
            topology,
            layers,
            learning_rate,
        })
    }

    /// Exports the full parameter set in `from_params` order.
    #[must_use]
    pub fn params(&self) -> Vec<f32> {
        let mut params = Vec::with_capacity(self.topology.parameter_count());
        for layer in &self.layers {
            params.extend(layer.weights.iter());
            params.extend(layer.biases.iter());
        }
        params
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Predicted return for every action given `observation`.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionViolation`] if the observation length does not
    /// match the configured input size or the forward pass degenerates into
    /// non-finite values.
    pub fn predict(&self, observation: &Observation) -> Result<Vec<f32>, PreconditionViolation> {
        let input = self.checked_input(observation)?;
        let (activations, _) = self.forward_trace(input);
        let output = activations.last().expect("trace holds the input layer");
        for &value in output {
            if !value.is_finite() {
                return Err(PreconditionViolation::NonFinite {
                    context: "value network prediction",
                    value,
                });
            }
        }
        Ok(output.to_vec())
    }

    /// One gradient step over the whole batch, minimizing mean squared error
    /// between predictions and `targets`. Returns the pre-update loss.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionViolation`] on shape mismatches or a
    /// non-finite loss.
    pub fn fit(
        &mut self,
        observations: &[Observation],
        targets: &[Vec<f32>],
    ) -> Result<f32, PreconditionViolation> {
        assert_eq!(observations.len(), targets.len());
        if observations.is_empty() {
            return Ok(0.0);
        }

        let dims = self.topology.layer_dims();
        let mut grad_w: Vec<Array2<f32>> =
            dims.iter().map(|&(i, o)| Array2::zeros((i, o))).collect();
        let mut grad_b: Vec<Array1<f32>> = dims.iter().map(|&(_, o)| Array1::zeros(o)).collect();
        let mut squared_error = 0.0_f32;

        for (observation, target) in observations.iter().zip(targets) {
            if target.len() != self.topology.output_len {
                return Err(PreconditionViolation::TargetLength {
                    expected: self.topology.output_len,
                    got: target.len(),
                });
            }
            let input = self.checked_input(observation)?;
            let (activations, pre_activations) = self.forward_trace(input);

            let target = Array1::from_vec(target.clone());
            let mut delta = activations.last().expect("trace holds the input layer") - &target;
            squared_error += delta.mapv(|d| d * d).sum();

            for i in (0..self.layers.len()).rev() {
                let input_col = activations[i].view().insert_axis(Axis(1));
                let delta_row = delta.view().insert_axis(Axis(0));
                grad_w[i] += &input_col.dot(&delta_row);
                grad_b[i] += &delta;
                if i > 0 {
                    let back = delta.dot(&self.layers[i].weights.t());
                    delta = back * pre_activations[i - 1].mapv(leaky_derivative);
                }
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let batch_len = observations.len() as f32;
        let step = self.learning_rate / batch_len;
        for (layer, (gw, gb)) in self.layers.iter_mut().zip(grad_w.iter().zip(&grad_b)) {
            layer.weights.scaled_add(-step, gw);
            layer.biases.scaled_add(-step, gb);
        }

        #[expect(clippy::cast_precision_loss)]
        let loss = squared_error / (batch_len * self.topology.output_len as f32);
        if loss.is_finite() {
            Ok(loss)
        } else {
            Err(PreconditionViolation::NonFinite {
                context: "value network training loss",
                value: loss,
            })
        }
    }

    fn checked_input(
        &self,
        observation: &Observation,
    ) -> Result<Array1<f32>, PreconditionViolation> {
        if observation.len() != self.topology.input_len {
            return Err(PreconditionViolation::ObservationLength {
                expected: self.topology.input_len,
                got: observation.len(),
            });
        }
        Ok(Array1::from_vec(observation.values().to_vec()))
    }

    /// Forward pass keeping every layer's input and pre-activation for
    /// backpropagation.
    fn forward_trace(&self, input: Array1<f32>) -> (Vec<Array1<f32>>, Vec<Array1<f32>>) {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        activations.push(input);
        for (i, layer) in self.layers.iter().enumerate() {
            let z = activations[i].dot(&layer.weights) + &layer.biases;
            let a = if i + 1 == self.layers.len() {
                z.clone()
            } else {
                z.mapv(leaky)
            };
            pre_activations.push(z);
            activations.push(a);
        }
        (activations, pre_activations)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn obs(values: &[f32]) -> Observation {
        Observation::from_values(values.to_vec())
    }

    #[test]
    fn scaled_topology_counts_parameters() {
        let topology = Topology::scaled(23, 6);
        assert_eq!(topology.hidden, vec![23, 18]);
        // 23*23+23 + 23*18+18 + 18*6+6
        assert_eq!(topology.parameter_count(), 552 + 432 + 114);
    }

    #[test]
    fn predict_has_one_value_per_action() {
        let mut rng = Pcg32::seed_from_u64(3);
        let net = ValueNetwork::new(Topology::scaled(23, 6), 0.01, &mut rng);
        let values = net.predict(&obs(&[0.25; 23])).unwrap();
        assert_eq!(values.len(), 6);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn single_linear_layer_computes_exactly() {
        let topology = Topology {
            input_len: 2,
            hidden: vec![],
            output_len: 2,
        };
        // weights row-major: [[1, 0], [0, 1]], biases [0.5, -0.5]
        let params = vec![1.0, 0.0, 0.0, 1.0, 0.5, -0.5];
        let net = ValueNetwork::from_params(topology, 0.01, &params).unwrap();
        assert_eq!(net.predict(&obs(&[2.0, 3.0])).unwrap(), vec![2.5, 2.5]);
    }

    #[test]
    fn params_roundtrip_through_from_params() {
        let mut rng = Pcg32::seed_from_u64(11);
        let net = ValueNetwork::new(Topology::scaled(9, 4), 0.05, &mut rng);
        let params = net.params();
        assert_eq!(params.len(), net.topology().parameter_count());
        let rebuilt = ValueNetwork::from_params(net.topology().clone(), 0.05, &params).unwrap();
        let probe = obs(&[0.5; 9]);
        assert_eq!(net.predict(&probe).unwrap(), rebuilt.predict(&probe).unwrap());
    }

    #[test]
    fn wrong_parameter_count_is_rejected() {
        let topology = Topology::scaled(9, 4);
        let short = vec![0.0; topology.parameter_count() - 1];
        let err = ValueNetwork::from_params(topology, 0.05, &short).unwrap_err();
        assert!(matches!(err, PreconditionViolation::ParameterCount { .. }));
    }

    #[test]
    fn wrong_observation_length_is_rejected() {
        let mut rng = Pcg32::seed_from_u64(5);
        let net = ValueNetwork::new(Topology::scaled(9, 4), 0.05, &mut rng);
        let err = net.predict(&obs(&[0.0; 8])).unwrap_err();
        assert_eq!(
            err,
            PreconditionViolation::ObservationLength {
                expected: 9,
                got: 8
            }
        );
    }

    #[test]
    fn topology_serializes_for_model_artifacts() {
        let topology = Topology::scaled(23, 6);
        let json = serde_json::to_string(&topology).unwrap();
        let back: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, topology);
    }

    #[test]
    fn repeated_fits_reduce_loss_on_a_fixed_batch() {
        let mut rng = Pcg32::seed_from_u64(17);
        let topology = Topology {
            input_len: 3,
            hidden: vec![8],
            output_len: 2,
        };
        let mut net = ValueNetwork::new(topology, 0.05, &mut rng);
        let batch = vec![obs(&[0.2, -0.4, 0.9]), obs(&[-0.7, 0.3, 0.1])];
        let targets = vec![vec![1.0, -1.0], vec![-0.5, 0.5]];

        let initial = net.fit(&batch, &targets).unwrap();
        let mut last = initial;
        for _ in 0..100 {
            last = net.fit(&batch, &targets).unwrap();
        }
        assert!(last < initial);
    }
}

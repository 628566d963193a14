use crate::domain::ports::Objective;
use crate::utils::error::{HarnessError, Result};

/// The Forrester test function for global optimization, negated so the
/// harness maximizes it. Known maximum is roughly 6.0207 at x = 0.7572.
///
/// See https://www.sfu.ca/~ssurjano/forretal08.html
#[derive(Debug, Clone, Copy, Default)]
pub struct Forrester;

impl Objective for Forrester {
    fn name(&self) -> &str {
        "forrester"
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let x0 = x[0];
        -((6.0 * x0 - 2.0).powi(2) * (12.0 * x0 - 4.0).sin())
    }
}

/// Negated sphere function, maximum 0.0 at the origin. Works in any
/// dimension, which makes it the objective of choice for joint
/// parameter/context evaluations.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    dim: usize,
}

impl Sphere {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Objective for Sphere {
    fn name(&self) -> &str {
        "sphere"
    }

    fn input_dim(&self) -> usize {
        self.dim
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        -x.iter().map(|v| v * v).sum::<f64>()
    }
}

/// Resolves a built-in objective from a configuration name.
pub fn objective_by_name(name: &str, input_dim: usize) -> Result<Box<dyn Objective>> {
    match name {
        "forrester" => {
            if input_dim != 1 {
                return Err(HarnessError::InvalidConfigValueError {
                    field: "problem.input_dim".to_string(),
                    value: input_dim.to_string(),
                    reason: "The Forrester function is one-dimensional".to_string(),
                });
            }
            Ok(Box::new(Forrester))
        }
        "sphere" => Ok(Box::new(Sphere::new(input_dim))),
        other => Err(HarnessError::UnknownObjective {
            name: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forrester_known_values() {
        let f = Forrester;
        assert!((f.evaluate(&[0.0]) - (-3.02721)).abs() < 1e-5);
        assert!((f.evaluate(&[0.757]) - 6.020707).abs() < 1e-5);
    }

    #[test]
    fn test_forrester_maximum_location() {
        // Known maximum of the negated function.
        let f = Forrester;
        let y_star = f.evaluate(&[0.7572]);
        assert!((y_star - 6.020739).abs() < 1e-5);
        assert!(f.evaluate(&[0.5]) < y_star);
        assert!(f.evaluate(&[1.0]) < y_star);
    }

    #[test]
    fn test_sphere_maximum_at_origin() {
        let f = Sphere::new(3);
        assert_eq!(f.evaluate(&[0.0, 0.0, 0.0]), 0.0);
        assert!(f.evaluate(&[1.0, -2.0, 0.5]) < 0.0);
        assert!((f.evaluate(&[1.0, -2.0, 0.5]) - (-5.25)).abs() < 1e-12);
    }

    #[test]
    fn test_objective_by_name() {
        assert_eq!(objective_by_name("forrester", 1).unwrap().input_dim(), 1);
        assert_eq!(objective_by_name("sphere", 4).unwrap().input_dim(), 4);
    }

    #[test]
    fn test_objective_by_name_rejects_bad_dim() {
        let err = objective_by_name("forrester", 2).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::InvalidConfigValueError { .. }
        ));
    }

    #[test]
    fn test_objective_by_name_unknown() {
        let err = objective_by_name("rosenbrock", 2).unwrap_err();
        assert!(matches!(err, HarnessError::UnknownObjective { .. }));
    }
}

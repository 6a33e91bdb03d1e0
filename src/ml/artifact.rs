//! Model artifact files
//!
//! An artifact is a serialized [`ModelArtifact`]. The encoding follows the
//! file extension: `.json` is read with serde_json, `.bin` with bincode.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::models::{LinearRegressionModel, LogisticRegressionModel, MLModel, Standardization};
use super::ModelMetadata;

#[cfg(feature = "ml")]
use super::smartcore::SmartcoreRandomForest;

/// Serialized form of every model kind this crate can run
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression(LinearRegressionModel),
    LogisticRegression(LogisticRegressionModel),
    #[cfg(feature = "ml")]
    RandomForest(SmartcoreRandomForest),
}

/// On-disk encoding of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("bin") => Ok(Self::Bincode),
            other => anyhow::bail!(
                "unsupported model file extension {:?} for {}; expected .json or .bin",
                other.unwrap_or(""),
                path.display()
            ),
        }
    }
}

impl ModelArtifact {
    pub fn decode(bytes: &[u8], format: ArtifactFormat) -> Result<Self> {
        let artifact = match format {
            ArtifactFormat::Json => {
                serde_json::from_slice(bytes).context("invalid JSON model artifact")?
            }
            ArtifactFormat::Bincode => {
                bincode::deserialize(bytes).context("invalid bincode model artifact")?
            }
        };
        Ok(artifact)
    }

    pub fn encode(&self, format: ArtifactFormat) -> Result<Vec<u8>> {
        Ok(match format {
            ArtifactFormat::Json => serde_json::to_vec_pretty(self)?,
            ArtifactFormat::Bincode => bincode::serialize(self)?,
        })
    }

    /// Turn the artifact into a runnable model
    pub fn into_model(self) -> Result<Arc<dyn MLModel>> {
        let model: Arc<dyn MLModel> = match self {
            Self::LinearRegression(m) => {
                check_shape(&m.metadata, m.coefficients.len(), m.standardization.as_ref())?;
                Arc::new(m)
            }
            Self::LogisticRegression(m) => {
                check_shape(&m.metadata, m.coefficients.len(), m.standardization.as_ref())?;
                Arc::new(m)
            }
            #[cfg(feature = "ml")]
            Self::RandomForest(mut m) => {
                m.restore_from_serialization()?;
                Arc::new(m)
            }
        };

        let labelled = model.metadata().model_type;
        if labelled != model.model_type() {
            anyhow::bail!(
                "model '{}' is labelled {} but the artifact holds a {}",
                model.metadata().model_id,
                labelled,
                model.model_type()
            );
        }
        Ok(model)
    }
}

fn check_shape(
    metadata: &ModelMetadata,
    coefficients: usize,
    scaler: Option<&Standardization>,
) -> Result<()> {
    let expected = metadata.feature_names.len();
    if coefficients != expected {
        anyhow::bail!(
            "model '{}' has {} coefficients but {} feature names",
            metadata.model_id,
            coefficients,
            expected
        );
    }
    if let Some(scaler) = scaler {
        if scaler.means.len() != expected || scaler.stds.len() != expected {
            anyhow::bail!(
                "model '{}' has {} means and {} stds for {} features",
                metadata.model_id,
                scaler.means.len(),
                scaler.stds.len(),
                expected
            );
        }
    }
    Ok(())
}

/// Read a model artifact from disk
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn MLModel>> {
    let path = path.as_ref();
    let format = ArtifactFormat::from_path(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;

    let model = ModelArtifact::decode(&bytes, format)
        .and_then(ModelArtifact::into_model)
        .with_context(|| format!("failed to load model from {}", path.display()))?;

    let meta = model.metadata();
    info!(
        model_id = %meta.model_id,
        model_type = %meta.model_type,
        version = %meta.version,
        features = meta.feature_names.len(),
        path = %path.display(),
        "model loaded"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{FeatureVector, ModelType};
    use std::io::Write;

    fn linear() -> LinearRegressionModel {
        LinearRegressionModel::new(
            vec![0.5, 2.0],
            1.0,
            ModelMetadata::new("solar_lr", ModelType::LinearRegression, &["a", "b"]),
        )
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_load_json_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = ModelArtifact::LinearRegression(linear())
            .encode(ArtifactFormat::Json)
            .unwrap();
        let path = write_file(&dir, "solar.json", &bytes);

        let model = load_model(&path).unwrap();
        assert_eq!(model.metadata().model_id, "solar_lr");

        let fv = FeatureVector::from_pairs(&[("a", 2.0), ("b", 1.0)]).unwrap();
        assert_eq!(model.predict(&fv).unwrap().value, 4.0);
    }

    #[test]
    fn test_load_bincode_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = LogisticRegressionModel::new(
            vec![1.0],
            -2.0,
            ModelMetadata::new("meter", ModelType::LogisticRegression, &["x"]),
        );
        let bytes = ModelArtifact::LogisticRegression(classifier)
            .encode(ArtifactFormat::Bincode)
            .unwrap();
        let path = write_file(&dir, "meter.bin", &bytes);

        let model = load_model(&path).unwrap();
        assert_eq!(model.model_type(), ModelType::LogisticRegression);
    }

    #[test]
    fn test_json_shape_is_externally_tagged() {
        let json = r#"{
            "logistic_regression": {
                "metadata": {
                    "model_id": "meter_anomaly",
                    "model_type": "logistic_regression",
                    "version": "2.1.0",
                    "feature_names": ["x"]
                },
                "coefficients": [1.5],
                "intercept": -0.5
            }
        }"#;
        let artifact = ModelArtifact::decode(json.as_bytes(), ArtifactFormat::Json).unwrap();
        match artifact {
            ModelArtifact::LogisticRegression(m) => {
                assert_eq!(m.threshold, 0.5);
                assert!(m.metadata.trained_at.is_none());
            }
            other => panic!("unexpected artifact {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_model("/nonexistent/solar_model.json").unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read model file"));
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.json", b"{not json");
        let err = load_model(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid JSON model artifact"));
    }

    #[test]
    fn test_coefficient_mismatch_is_rejected() {
        let mut model = linear();
        model.coefficients.push(1.0);
        let err = ModelArtifact::LinearRegression(model).into_model().err().unwrap();
        assert!(err.to_string().contains("3 coefficients but 2 feature names"));
    }

    #[test]
    fn test_short_scaler_is_rejected() {
        let model = linear().with_standardization(vec![0.0], vec![1.0, 1.0]);
        let err = ModelArtifact::LinearRegression(model).into_model().err().unwrap();
        assert!(err.to_string().contains("1 means and 2 stds for 2 features"));
    }

    #[test]
    fn test_label_must_match_artifact_kind() {
        let mut model = linear();
        model.metadata.model_type = ModelType::LogisticRegression;
        let err = ModelArtifact::LinearRegression(model).into_model().err().unwrap();
        assert!(err
            .to_string()
            .contains("labelled logistic_regression but the artifact holds a linear_regression"));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(ArtifactFormat::from_path(Path::new("model.pkl")).is_err());
        assert_eq!(
            ArtifactFormat::from_path(Path::new("model.bin")).unwrap(),
            ArtifactFormat::Bincode
        );
    }

    #[cfg(feature = "ml")]
    #[test]
    fn test_forest_artifact_round_trip() {
        let forest = crate::ml::smartcore::tests::fitted_forest();
        let bytes = ModelArtifact::RandomForest(forest)
            .encode(ArtifactFormat::Bincode)
            .unwrap();
        let model = ModelArtifact::decode(&bytes, ArtifactFormat::Bincode)
            .unwrap()
            .into_model()
            .unwrap();

        let fv = FeatureVector::from_pairs(&[("x1", 2.0), ("x2", 2.0)]).unwrap();
        assert!(model.predict(&fv).is_ok());
    }
}

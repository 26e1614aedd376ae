//! Garment ingestion: classify a photo, then persist it.

use tracing::info;

use stylesense_core::defaults::UNKNOWN_LABEL;
use stylesense_core::{
    CreateGarmentRequest, EncodedImage, Error, GarmentRecord, GarmentRepository, Result,
    VisionBackend,
};
use stylesense_inference::GarmentClassifier;

/// Blank labels are stored as "Unknown".
pub fn label_or_unknown(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        label.to_string()
    }
}

/// Classify `image` and store the garment. Nothing is written when
/// classification fails.
pub async fn ingest_garment<R, B>(
    repo: &R,
    classifier: &GarmentClassifier<B>,
    image: &EncodedImage,
) -> Result<GarmentRecord>
where
    R: GarmentRepository + ?Sized,
    B: VisionBackend + ?Sized,
{
    let analysis = classifier.classify(image).await?;

    let request = CreateGarmentRequest {
        image_data: image.to_data_uri(),
        category: label_or_unknown(&analysis.category),
        color: label_or_unknown(&analysis.color),
        tags: analysis.joined_tags(),
    };
    let id = repo.create(request).await?;

    info!(
        subsystem = "api",
        component = "ingest",
        op = "ingest",
        garment_id = id,
        "Garment ingested"
    );

    repo.get(id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Garment {} missing after insert", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stylesense_db::Database;
    use stylesense_inference::mock::{MockFailure, MockInferenceBackend, MockReply};

    fn photo() -> EncodedImage {
        EncodedImage::new("image/jpeg", "/9j/4AAQ")
    }

    #[test]
    fn test_label_or_unknown() {
        assert_eq!(label_or_unknown(" navy "), "navy");
        assert_eq!(label_or_unknown("  "), "Unknown");
    }

    #[tokio::test]
    async fn test_ingest_persists_classified_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        let backend = MockInferenceBackend::new().with_vision_replies([MockReply::Text(
            r#"{"category": "top", "color": "", "tags": ["linen", "summer"]}"#.into(),
        )]);
        let classifier = GarmentClassifier::new(Arc::new(backend));

        let record = ingest_garment(&db.garments, &classifier, &photo())
            .await
            .unwrap();

        assert_eq!(record.category, "top");
        assert_eq!(record.color, "Unknown");
        assert_eq!(record.tags, "linen, summer");
        assert_eq!(record.image_data, "data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(db.garments.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_classification_writes_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        let backend =
            MockInferenceBackend::new().with_vision_replies([MockReply::Fail(MockFailure::Quota)]);
        let classifier = GarmentClassifier::new(Arc::new(backend));

        let err = ingest_garment(&db.garments, &classifier, &photo())
            .await
            .unwrap_err();

        assert!(err.is_quota_exceeded());
        assert!(db.garments.list().await.unwrap().is_empty());
    }
}

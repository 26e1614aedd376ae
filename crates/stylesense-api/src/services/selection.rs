//! Try-on request preparation: input checks, confirmation policy and
//! garment resolution. Everything here runs before any AI call.

use tracing::debug;

use stylesense_core::{EncodedImage, Error, GarmentRepository, Result, TryOnGarment};
use stylesense_inference::CredentialTier;

/// Validated inputs for a try-on run.
#[derive(Debug, Clone)]
pub struct PreparedTryOn {
    pub base: EncodedImage,
    /// In request order, duplicates preserved.
    pub garments: Vec<TryOnGarment>,
}

/// Check and resolve a try-on request.
///
/// Multi-garment runs on a standard credential need `confirmed`, since they
/// are the runs most likely to hit the quota.
pub async fn prepare_try_on<R>(
    repo: &R,
    base_photo: &str,
    garment_ids: &[i64],
    confirmed: bool,
    tier: CredentialTier,
) -> Result<PreparedTryOn>
where
    R: GarmentRepository + ?Sized,
{
    if garment_ids.is_empty() {
        return Err(Error::InvalidInput(
            "Select at least one garment to try on".to_string(),
        ));
    }

    let base = EncodedImage::parse(base_photo)
        .map_err(|e| Error::InvalidInput(format!("Invalid base photo: {}", e)))?;

    let mut garments = Vec::with_capacity(garment_ids.len());
    for id in garment_ids {
        let record = repo
            .get(*id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Garment {} not found", id)))?;
        let image = EncodedImage::parse(&record.image_data).map_err(|e| {
            Error::Internal(format!("Stored image for garment {} is unreadable: {}", id, e))
        })?;
        garments.push(TryOnGarment {
            image,
            category: record.category,
            color: record.color,
        });
    }

    if garments.len() > 1 && !tier.is_elevated() && !confirmed {
        return Err(Error::ConfirmationRequired(format!(
            "Layering {} garments on a standard API key may exceed the usage quota. \
             Confirm to continue or connect a higher-tier key.",
            garments.len()
        )));
    }

    debug!(
        subsystem = "api",
        component = "selection",
        total = garments.len(),
        tier = tier.as_str(),
        confirmed,
        "Try-on prepared"
    );
    Ok(PreparedTryOn { base, garments })
}

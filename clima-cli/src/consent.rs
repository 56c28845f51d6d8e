use async_trait::async_trait;
use clima_core::{ClimaError, Coordinates, Geolocator, LocationSource};
use std::{io::IsTerminal, sync::Arc};

/// Asks before every lookup, the way a browser asks for location permission.
#[derive(Debug)]
pub struct ConsentGeolocator {
    inner: Arc<dyn Geolocator>,
}

#[async_trait]
impl Geolocator for ConsentGeolocator {
    async fn locate(&self) -> Result<Coordinates, ClimaError> {
        let answer = tokio::task::spawn_blocking(|| {
            inquire::Confirm::new("Allow clima to look up your approximate location?")
                .with_default(true)
                .prompt()
        })
        .await
        .map_err(|e| ClimaError::GeolocationDenied(format!("prompt failed: {e}")))?;

        match answer {
            Ok(true) => self.inner.locate().await,
            Ok(false) => Err(ClimaError::GeolocationDenied("permission declined".into())),
            Err(e) => Err(ClimaError::GeolocationDenied(format!("prompt failed: {e}"))),
        }
    }
}

/// Put the consent prompt in front of device geolocation when asked to and
/// when there is someone to answer it.
pub fn guard(source: LocationSource, ask: bool) -> LocationSource {
    match source {
        LocationSource::Device(inner) if ask && std::io::stdin().is_terminal() => {
            LocationSource::Device(Arc::new(ConsentGeolocator { inner }))
        }
        other => other,
    }
}

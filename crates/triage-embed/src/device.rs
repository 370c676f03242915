use candle_core::Device;
use triage_core::config::DevicePreference;

/// Resolve where the transformer embedder runs. `Cpu` always wins; `Auto`
/// tries Metal first when the crate is built with the `metal` feature.
pub fn select_device(preference: DevicePreference) -> Device {
    if preference == DevicePreference::Cpu {
        tracing::info!("device: CPU (configured)");
        return Device::Cpu;
    }
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => {
                tracing::info!("device: Metal");
                return dev;
            }
            Err(e) => tracing::warn!(error = %e, "Metal unavailable, falling back to CPU"),
        }
    }
    tracing::info!("device: CPU");
    Device::Cpu
}

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

/// Which output device to open
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// Host default output
    #[default]
    Default,
    /// Index into the device list, or a case-insensitive name substring
    Search(String),
}

impl DeviceSelector {
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("default") {
            DeviceSelector::Default
        } else {
            DeviceSelector::Search(value.to_string())
        }
    }
}

/// List available audio output devices
pub fn list_audio_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let mut devices: Vec<String> = host
        .output_devices()?
        .filter_map(|device| device.description().ok().map(|desc| desc.name().to_string()))
        .collect();

    // Some hosts leave the default device out of the enumeration
    if let Some(default_device) = host.default_output_device() {
        if let Ok(default_desc) = default_device.description() {
            let default_name = default_desc.name().to_string();
            if !devices.contains(&default_name) {
                devices.push(default_name);
            }
        }
    }

    if devices.is_empty() {
        return Err(anyhow!("No audio output devices found"));
    }

    Ok(devices)
}

/// Find audio device index by name or index string
pub fn find_audio_device(devices: &[String], search: &str) -> Result<usize> {
    if let Ok(index) = search.parse::<usize>() {
        if index < devices.len() {
            return Ok(index);
        } else {
            return Err(anyhow!(
                "Audio device index {} out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    let search_lower = search.to_lowercase();
    devices
        .iter()
        .position(|device| device.to_lowercase().contains(&search_lower))
        .ok_or_else(|| anyhow!("Audio device '{}' not found", search))
}

/// Resolve a selector to a concrete cpal device
pub fn resolve_device(selector: &DeviceSelector) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match selector {
        DeviceSelector::Default => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default audio output device")),
        DeviceSelector::Search(search) => {
            let names = list_audio_devices()?;
            let index = find_audio_device(&names, search)?;
            let wanted = &names[index];

            host.output_devices()?
                .find(|device| {
                    device
                        .description()
                        .map(|desc| desc.name() == wanted.as_str())
                        .unwrap_or(false)
                })
                .or_else(|| host.default_output_device())
                .ok_or_else(|| anyhow!("Selected audio device '{}' not available", wanted))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<String> {
        vec!["Built-in Output".to_string(), "USB Headphones".to_string()]
    }

    #[test]
    fn test_find_by_index() {
        assert_eq!(find_audio_device(&devices(), "1").unwrap(), 1);
        assert!(find_audio_device(&devices(), "5").is_err());
    }

    #[test]
    fn test_find_by_substring() {
        assert_eq!(find_audio_device(&devices(), "headphones").unwrap(), 1);
        assert!(find_audio_device(&devices(), "hdmi").is_err());
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(DeviceSelector::parse("default"), DeviceSelector::Default);
        assert_eq!(DeviceSelector::parse(""), DeviceSelector::Default);
        assert_eq!(
            DeviceSelector::parse("usb"),
            DeviceSelector::Search("usb".to_string())
        );
    }
}

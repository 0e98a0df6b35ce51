use port_attributes::{AttributeKey, AttributeValue, DeviceAttributes};

/// Human readable listing of a port's attributes.
pub fn render_text(port: &str, attributes: &DeviceAttributes) -> String {
    let identity = attributes
        .identity()
        .map_or_else(|| String::from("unknown"), |identity| identity.to_string());

    let mut out = format!("Port: {}\n  VID:PID: {}\n", port, identity);
    for (key, value) in attributes.iter() {
        out.push_str(&format!("  {}: {}\n", key, render_value(key, value)));
    }

    out
}

/// Descriptor fields are printed as 4-digit hex, the way USB IDs are written.
fn render_value(key: &str, value: &AttributeValue) -> String {
    let hex = [
        AttributeKey::VendorId,
        AttributeKey::ProductId,
        AttributeKey::DeviceRelease,
    ];

    match value {
        AttributeValue::Number(n) if hex.iter().any(|k| k.as_str() == key) => format!("{:04x}", n),
        _ => value.to_string(),
    }
}

pub fn render_json(port: &str, attributes: &DeviceAttributes) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "port": port,
        "identity": attributes.identity().map(|identity| identity.to_string()),
        "attributes": attributes,
    }))
}

use std::collections::HashSet;

use crate::{
    config::BoardConfig,
    error::{AppError, Result},
    services::pin::types::Pin,
};

pub fn validate_pin_geometry(pin: &Pin) -> Result<()> {
    if pin.id.is_empty() {
        return Err(AppError::InvalidParams("Pin id must not be empty".into()));
    }
    if !pin.position_x.is_finite() || !pin.position_y.is_finite() {
        return Err(AppError::InvalidParams("Pin coordinates must be finite".into()));
    }
    if !pin.size.is_finite() || pin.size <= 0.0 {
        return Err(AppError::InvalidParams("Pin size must be positive".into()));
    }
    Ok(())
}

pub fn validate_pin_name(config: &BoardConfig, pin: &Pin) -> Result<()> {
    if let Some(name) = &pin.name
        && name.chars().count() > config.max_pin_name_length
    {
        return Err(AppError::InvalidParams("Pin name too long".into()));
    }
    Ok(())
}

pub fn validate_attesters(pin: &Pin) -> Result<()> {
    let mut seen = HashSet::with_capacity(pin.validated_by.len());
    if pin.validated_by.iter().all(|client_id| seen.insert(client_id)) {
        Ok(())
    } else {
        Err(AppError::InvalidParams("Duplicate attester on pin".into()))
    }
}

pub fn validate_chat_content(config: &BoardConfig, content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidParams("Chat message must not be empty".into()));
    }
    if content.chars().count() > config.max_chat_message_length {
        return Err(AppError::InvalidParams("Chat message too long".into()));
    }
    Ok(())
}

/// Full check applied to every pin arriving from the network.
pub fn validate_pin(config: &BoardConfig, pin: &Pin) -> Result<()> {
    validate_pin_geometry(pin)?;
    validate_pin_name(config, pin)?;
    validate_attesters(pin)
}

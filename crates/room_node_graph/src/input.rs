// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer events delivered by the host window.

use egui::{Pos2, Vec2};

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
}

/// What happened to the button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    /// Button pressed
    Down,
    /// Button released
    Up,
    /// Pointer moved while the button is held
    Drag,
}

/// A raw pointer event in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event kind
    pub kind: PointerEventKind,
    /// Button involved
    pub button: PointerButton,
    /// Pointer position
    pub position: Pos2,
    /// Movement since the previous event
    pub delta: Vec2,
}

impl PointerEvent {
    /// Button press at `position`
    pub fn down(button: PointerButton, position: Pos2) -> Self {
        Self {
            kind: PointerEventKind::Down,
            button,
            position,
            delta: Vec2::ZERO,
        }
    }

    /// Pointer moved to `position` by `delta` with `button` held
    pub fn drag(button: PointerButton, position: Pos2, delta: Vec2) -> Self {
        Self {
            kind: PointerEventKind::Drag,
            button,
            position,
            delta,
        }
    }

    /// Button release at `position`
    pub fn up(button: PointerButton, position: Pos2) -> Self {
        Self {
            kind: PointerEventKind::Up,
            button,
            position,
            delta: Vec2::ZERO,
        }
    }
}

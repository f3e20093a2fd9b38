mod case_service;

pub use self::case_service::{
    BackendError, CaseService, CaseServiceOperation, CaseServiceOutput, PermissionsResult,
    RecordsResult, StatusUpdateResult, UserPermissions,
};

// Crux's built-in Render capability is the render callback for the shell.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub case_service: CaseService<Event>,
    pub render: Render<Event>,
}

//! C ABI definitions shared between the shim library and the host loader.
//!
//! Layouts follow the GDExtension loader convention. Nothing in here holds
//! state.

use std::ffi::{c_char, c_void};

use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// Host boolean, one byte wide.
pub type Bool = u8;

pub const TRUE: Bool = 1;
pub const FALSE: Bool = 0;

/// Opaque handle the host assigns to this library.
pub type ClassLibraryPtr = *mut c_void;

pub type InterfaceFunctionPtr = Option<unsafe extern "C" fn()>;

/// Host function used to resolve engine API functions by name.
pub type GetProcAddress =
    Option<unsafe extern "C" fn(function_name: *const c_char) -> InterfaceFunctionPtr>;

pub type InitializeCb = extern "C" fn(userdata: *mut c_void, level: u32);
pub type DeinitializeCb = extern "C" fn(userdata: *mut c_void, level: u32);

/// Signature of the function the host invokes when it loads the library.
pub type EntryPointFn = unsafe extern "C" fn(
    get_proc_address: GetProcAddress,
    library: ClassLibraryPtr,
    initialization: *mut Initialization,
) -> Bool;

/// Output struct filled by the entry point.
#[repr(C)]
#[derive(Debug)]
pub struct Initialization {
    pub minimum_initialization_level: u32,
    pub userdata: *mut c_void,
    pub initialize: Option<InitializeCb>,
    pub deinitialize: Option<DeinitializeCb>,
}

impl Default for Initialization {
    fn default() -> Self {
        Self {
            minimum_initialization_level: InitializationLevel::Core as u32,
            userdata: std::ptr::null_mut(),
            initialize: None,
            deinitialize: None,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr)]
pub enum InitializationLevel {
    Core = 0,
    Servers = 1,
    Scene = 2,
    Editor = 3,
}

/// Error codes reported by the host when a method call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorType {
    Ok,
    InvalidMethod,
    InvalidArgument,
    TooManyArguments,
    TooFewArguments,
    InstanceIsNull,
    MethodNotConst,
    /// A code introduced by a newer host than these bindings know about.
    Unknown(i32),
}

impl CallErrorType {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => CallErrorType::Ok,
            1 => CallErrorType::InvalidMethod,
            2 => CallErrorType::InvalidArgument,
            3 => CallErrorType::TooManyArguments,
            4 => CallErrorType::TooFewArguments,
            5 => CallErrorType::InstanceIsNull,
            6 => CallErrorType::MethodNotConst,
            other => CallErrorType::Unknown(other),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CallErrorType::Ok)
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

#[cfg(feature = "log")]
impl From<LogLevel> for log::LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

use gdshim_include::{Bool, ClassLibraryPtr, EntryPointFn, GetProcAddress, Initialization, FALSE};
use parking_lot::Mutex;

/// Single-slot holder for the function the host's entry point forwards to.
///
/// The host resolves a fixed symbol, but the real initialization routine is
/// only known once code linked into this library has run. That code calls
/// [`EntryPointSlot::register`] after load and before the host calls in.
#[derive(Debug, Default)]
pub struct EntryPointSlot {
    held: Mutex<Option<EntryPointFn>>,
}

impl EntryPointSlot {
    pub const fn new() -> Self {
        Self {
            held: parking_lot::const_mutex(None),
        }
    }

    /// The process-wide slot read by `gdshim_library_init`.
    pub fn global() -> &'static EntryPointSlot {
        static INSTANCE: EntryPointSlot = EntryPointSlot::new();
        &INSTANCE
    }

    /// Store `entry`, replacing any earlier registration.
    pub fn register(&self, entry: EntryPointFn) {
        let previous = self.held.lock().replace(entry);
        if previous.is_some() {
            log::warn!("Entry point registered more than once, the last registration wins.");
        } else {
            log::debug!("Entry point registered.");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.held.lock().is_some()
    }

    pub fn reset(&self) {
        self.held.lock().take();
    }

    /// Forward the host's call to the registered function and return its
    /// result unchanged. An empty slot yields `FALSE`.
    ///
    /// # Safety
    ///
    /// The arguments are passed through untouched, so they must satisfy
    /// whatever the registered function requires of them.
    pub unsafe fn invoke(
        &self,
        get_proc_address: GetProcAddress,
        library: ClassLibraryPtr,
        initialization: *mut Initialization,
    ) -> Bool {
        // copy out so the lock is released before calling foreign code
        let entry = *self.held.lock();
        match entry {
            Some(entry) => unsafe { entry(get_proc_address, library, initialization) },
            None => {
                log::error!("Host called the entry point before any entry point was registered.");
                FALSE
            }
        }
    }
}

/// Register `entry` in the process-wide slot.
pub fn register_entry_point(entry: EntryPointFn) {
    EntryPointSlot::global().register(entry)
}

/// C registration point for code that is not written in Rust.
#[unsafe(no_mangle)]
pub extern "C" fn gdshim_define_entry_point(entry: Option<EntryPointFn>) {
    match entry {
        Some(entry) => register_entry_point(entry),
        None => log::error!("gdshim_define_entry_point called with a null function."),
    }
}

/// The fixed symbol the host resolves after loading the library.
///
/// # Safety
///
/// Only the host loader should call this, with the pointers it owns.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gdshim_library_init(
    get_proc_address: GetProcAddress,
    library: ClassLibraryPtr,
    initialization: *mut Initialization,
) -> Bool {
    crate::bootstrap();
    unsafe { EntryPointSlot::global().invoke(get_proc_address, library, initialization) }
}

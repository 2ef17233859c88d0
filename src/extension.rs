use std::{
    ffi::{c_void, CStr},
    sync::{Arc, LazyLock},
};

use gdshim_include::{
    ClassLibraryPtr, GetProcAddress, Initialization, InitializationLevel, InterfaceFunctionPtr,
};
use parking_lot::Mutex;

use crate::error::{Error, Result};

pub type LevelHook = Arc<dyn Fn(InitializationLevel) + Send + Sync>;

/// Callbacks run for every initialization level the host walks through.
#[derive(Clone)]
pub struct ExtensionHooks {
    pub init: LevelHook,
    pub deinit: LevelHook,
}

impl ExtensionHooks {
    pub fn new<I, D>(init: I, deinit: D) -> Self
    where
        I: Fn(InitializationLevel) + Send + Sync + 'static,
        D: Fn(InitializationLevel) + Send + Sync + 'static,
    {
        Self {
            init: Arc::new(init),
            deinit: Arc::new(deinit),
        }
    }
}

impl std::fmt::Debug for ExtensionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHooks").finish_non_exhaustive()
    }
}

/// Host pointers and level hooks received through the entry point.
#[derive(Debug, Default)]
pub struct ExtensionModule {
    inner: Mutex<ExtensionModuleInner>,
}

#[derive(Debug, Default)]
struct ExtensionModuleInner {
    interface: GetProcAddress,
    library: Option<ClassLibraryPtr>,
    hooks: Option<ExtensionHooks>,
}

unsafe impl Send for ExtensionModuleInner {}
unsafe impl Sync for ExtensionModuleInner {}

impl ExtensionModule {
    pub fn instance() -> &'static ExtensionModule {
        static INSTANCE: LazyLock<ExtensionModule> = LazyLock::new(ExtensionModule::default);
        &INSTANCE
    }

    /// Fill `initialization` with the level dispatchers and remember the host
    /// pointers. Meant to be called from a registered entry point.
    ///
    /// Only the first library handle is kept; later calls just replace the
    /// interface pointer and the hooks.
    ///
    /// # Safety
    ///
    /// `initialization` must be null or valid for writes.
    pub unsafe fn initialize(
        &self,
        get_proc_address: GetProcAddress,
        library: ClassLibraryPtr,
        initialization: *mut Initialization,
        hooks: ExtensionHooks,
    ) -> Result<()> {
        if get_proc_address.is_none() {
            return Err(Error::NullPointer("get_proc_address"));
        }
        if library.is_null() {
            return Err(Error::NullPointer("library"));
        }
        // SAFETY: non-null and valid for writes per the caller contract
        let Some(initialization) = (unsafe { initialization.as_mut() }) else {
            return Err(Error::NullPointer("initialization"));
        };

        {
            let mut inner = self.inner.lock();
            inner.interface = get_proc_address;
            if inner.library.is_none() {
                inner.library = Some(library);
            }
            inner.hooks = Some(hooks);
        }

        initialization.initialize = Some(extension_initialize);
        initialization.deinitialize = Some(extension_deinitialize);
        initialization.minimum_initialization_level = InitializationLevel::Scene as u32;

        log::info!("Extension module initialized.");
        Ok(())
    }

    /// Record host pointers when the engine is embedded in this process
    /// rather than loading us as an extension.
    pub fn set_extension_interface(
        &self,
        get_proc_address: GetProcAddress,
        library: ClassLibraryPtr,
    ) {
        if get_proc_address.is_none() {
            log::error!("Expected a pointer to the host's get_proc_address function.");
            return;
        }
        let mut inner = self.inner.lock();
        inner.interface = get_proc_address;
        inner.library = Some(library);
    }

    pub fn library(&self) -> Option<ClassLibraryPtr> {
        self.inner.lock().library
    }

    pub fn interface(&self) -> GetProcAddress {
        self.inner.lock().interface
    }

    /// Look up a host API function by name.
    ///
    /// # Safety
    ///
    /// The stored interface pointer must still be callable.
    pub unsafe fn get_proc_address(&self, name: &CStr) -> InterfaceFunctionPtr {
        let interface = self.interface()?;
        unsafe { interface(name.as_ptr()) }
    }

    pub fn reset(&self) {
        *self.inner.lock() = ExtensionModuleInner::default();
    }

    /// Run the init hook for a raw level coming from the host.
    pub fn dispatch_initialize(&self, level: u32) {
        let Some(level) = decode_level(level) else {
            return;
        };
        let hook = self.inner.lock().hooks.as_ref().map(|h| h.init.clone());
        match hook {
            Some(hook) => hook(level),
            None => log::warn!("No init hook installed for level {:?}.", level),
        }
    }

    /// Run the deinit hook for a raw level coming from the host.
    pub fn dispatch_deinitialize(&self, level: u32) {
        let Some(level) = decode_level(level) else {
            return;
        };
        let hook = self.inner.lock().hooks.as_ref().map(|h| h.deinit.clone());
        if let Some(hook) = hook {
            hook(level)
        }
    }
}

fn decode_level(level: u32) -> Option<InitializationLevel> {
    let decoded = InitializationLevel::from_repr(level);
    if decoded.is_none() {
        log::error!("Host sent unknown initialization level {}, ignoring.", level);
    }
    decoded
}

extern "C" fn extension_initialize(_userdata: *mut c_void, level: u32) {
    ExtensionModule::instance().dispatch_initialize(level)
}

extern "C" fn extension_deinitialize(_userdata: *mut c_void, level: u32) {
    ExtensionModule::instance().dispatch_deinitialize(level)
}

/// Shorthand for [`ExtensionModule::initialize`] on the process-wide module.
///
/// # Safety
///
/// See [`ExtensionModule::initialize`].
pub unsafe fn initialize_module(
    get_proc_address: GetProcAddress,
    library: ClassLibraryPtr,
    initialization: *mut Initialization,
    hooks: ExtensionHooks,
) -> Result<()> {
    unsafe {
        ExtensionModule::instance().initialize(get_proc_address, library, initialization, hooks)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::c_char;

    use gdshim_include::{Bool, FALSE, TRUE};

    use super::*;
    use crate::entry::EntryPointSlot;
    use crate::tests::{global_state_lock, init_logging};

    static SEEN_LEVELS: Mutex<Vec<(bool, InitializationLevel)>> =
        parking_lot::const_mutex(Vec::new());

    unsafe extern "C" fn test_get_proc_address(_name: *const c_char) -> InterfaceFunctionPtr {
        None
    }

    fn recording_hooks() -> ExtensionHooks {
        ExtensionHooks::new(
            |level| SEEN_LEVELS.lock().push((true, level)),
            |level| SEEN_LEVELS.lock().push((false, level)),
        )
    }

    unsafe extern "C" fn test_entry(
        get_proc_address: GetProcAddress,
        library: ClassLibraryPtr,
        initialization: *mut Initialization,
    ) -> Bool {
        let result = unsafe {
            initialize_module(get_proc_address, library, initialization, recording_hooks())
        };
        match result {
            Ok(()) => TRUE,
            Err(e) => {
                log::error!("{}", e);
                FALSE
            }
        }
    }

    fn library_ptr(marker: &mut u8) -> ClassLibraryPtr {
        marker as *mut u8 as ClassLibraryPtr
    }

    #[test]
    fn test_entry_point_fills_initialization() {
        init_logging();
        let _guard = global_state_lock();
        ExtensionModule::instance().reset();
        SEEN_LEVELS.lock().clear();

        let slot = EntryPointSlot::new();
        slot.register(test_entry);

        let mut marker = 0u8;
        let library = library_ptr(&mut marker);
        let mut init = Initialization::default();
        let result = unsafe { slot.invoke(Some(test_get_proc_address), library, &mut init) };

        assert_eq!(result, TRUE);
        assert_eq!(
            init.minimum_initialization_level,
            InitializationLevel::Scene as u32
        );
        assert_eq!(ExtensionModule::instance().library(), Some(library));

        let initialize = init.initialize.unwrap();
        let deinitialize = init.deinitialize.unwrap();
        initialize(std::ptr::null_mut(), 2);
        initialize(std::ptr::null_mut(), 99);
        deinitialize(std::ptr::null_mut(), 3);

        assert_eq!(
            *SEEN_LEVELS.lock(),
            vec![
                (true, InitializationLevel::Scene),
                (false, InitializationLevel::Editor)
            ]
        );

        ExtensionModule::instance().reset();
    }

    #[test]
    fn test_null_pointers_are_rejected() {
        init_logging();
        let module = ExtensionModule::default();
        let mut marker = 0u8;
        let mut init = Initialization::default();

        let result = unsafe {
            module.initialize(None, library_ptr(&mut marker), &mut init, recording_hooks())
        };
        assert!(matches!(result, Err(Error::NullPointer("get_proc_address"))));

        let result = unsafe {
            module.initialize(
                Some(test_get_proc_address),
                library_ptr(&mut marker),
                std::ptr::null_mut(),
                recording_hooks(),
            )
        };
        assert!(matches!(result, Err(Error::NullPointer("initialization"))));
        assert!(init.initialize.is_none());
        assert!(module.library().is_none());
    }

    #[test]
    fn test_first_library_handle_is_kept() {
        let module = ExtensionModule::default();
        let mut first = 0u8;
        let mut second = 0u8;
        let mut init = Initialization::default();

        unsafe {
            module
                .initialize(
                    Some(test_get_proc_address),
                    library_ptr(&mut first),
                    &mut init,
                    recording_hooks(),
                )
                .unwrap();
            module
                .initialize(
                    Some(test_get_proc_address),
                    library_ptr(&mut second),
                    &mut init,
                    recording_hooks(),
                )
                .unwrap();
        }

        assert_eq!(module.library(), Some(library_ptr(&mut first)));
    }

    #[test]
    fn test_set_extension_interface() {
        init_logging();
        let module = ExtensionModule::default();
        let mut marker = 0u8;

        module.set_extension_interface(None, library_ptr(&mut marker));
        assert!(module.library().is_none());

        module.set_extension_interface(Some(test_get_proc_address), library_ptr(&mut marker));
        assert_eq!(module.library(), Some(library_ptr(&mut marker)));
        assert!(module.interface().is_some());
        assert!(unsafe { module.get_proc_address(c"mem_alloc") }.is_none());
    }

    #[test]
    fn test_dispatch_without_hooks_is_harmless() {
        init_logging();
        let module = ExtensionModule::default();
        module.dispatch_initialize(0);
        module.dispatch_deinitialize(1);
    }
}

/// DXGI - adapter enumeration, display modes and presentation support
///
/// Shared by the D3D11 and D3D12 devices.

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{
    register_adapters, AdapterDesc, AdapterHandle, Display, DisplayMode, Format, GpuList,
    WindowTarget,
};
use aurora_rhi::{engine_debug, engine_error, engine_warn};
use raw_window_handle::RawWindowHandle;
use windows::core::Interface;
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT;
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory1, IDXGIAdapter1, IDXGIFactory1, IDXGIFactory5, DXGI_ADAPTER_FLAG_SOFTWARE,
    DXGI_ENUM_MODES, DXGI_FEATURE_PRESENT_ALLOW_TEARING, DXGI_MODE_DESC,
};

use crate::dxgi_tables::{adapter_name, dxgi_format, gpu_type_from_adapter, luid_to_handle};

const SOURCE: &str = "aurora::dxgi";

/// Log a failed native call and turn it into an `Error`
pub(crate) fn hr_error(source: &str, what: &str, e: windows::core::Error) -> Error {
    engine_error!(source, "{}: {} (0x{:08X})", what, e.message(), e.code().0 as u32);
    Error::BackendError(format!("{}: {}", what, e.message()))
}

/// Same as [`hr_error`] for device creation steps
pub(crate) fn init_error(source: &str, what: &str, e: windows::core::Error) -> Error {
    engine_error!(source, "{}: {} (0x{:08X})", what, e.message(), e.code().0 as u32);
    Error::InitializationFailed(format!("{}: {}", what, e.message()))
}

/// Win32 window handle of a window target
pub fn hwnd(window: &WindowTarget) -> Result<HWND> {
    match window.raw_window_handle() {
        RawWindowHandle::Win32(handle) => Ok(HWND(handle.hwnd.get() as *mut std::ffi::c_void)),
        other => Err(Error::InvalidArgument(format!(
            "DXGI swapchains need a Win32 window, got {:?}",
            other
        ))),
    }
}

pub fn create_factory() -> Result<IDXGIFactory1> {
    unsafe { CreateDXGIFactory1::<IDXGIFactory1>() }
        .map_err(|e| init_error(SOURCE, "CreateDXGIFactory1 failed", e))
}

/// True when flip-model swapchains may tear (`IDXGIFactory5`)
pub fn tearing_supported(factory: &IDXGIFactory1) -> bool {
    let Ok(factory5) = factory.cast::<IDXGIFactory5>() else {
        engine_debug!(SOURCE, "IDXGIFactory5 unavailable, tearing disabled");
        return false;
    };

    let mut allow = BOOL::default();
    let result = unsafe {
        factory5.CheckFeatureSupport(
            DXGI_FEATURE_PRESENT_ALLOW_TEARING,
            &mut allow as *mut BOOL as *mut std::ffi::c_void,
            std::mem::size_of::<BOOL>() as u32,
        )
    };
    result.is_ok() && allow.as_bool()
}

/// Every display mode of every output of `adapter` in `format`
///
/// `None` when the adapter has no output or a query fails.
fn adapter_display_modes(adapter: &IDXGIAdapter1, format: Format) -> Option<Vec<DisplayMode>> {
    let format = DXGI_FORMAT(dxgi_format(format));
    let mut modes = Vec::new();
    let mut output_index = 0;

    while let Ok(output) = unsafe { adapter.EnumOutputs(output_index) } {
        output_index += 1;

        let mut count = 0u32;
        unsafe { output.GetDisplayModeList(format, DXGI_ENUM_MODES(0), &mut count, None) }.ok()?;
        let mut descs = vec![DXGI_MODE_DESC::default(); count as usize];
        unsafe { output.GetDisplayModeList(format, DXGI_ENUM_MODES(0), &mut count, Some(descs.as_mut_ptr())) }.ok()?;
        descs.truncate(count as usize);

        modes.extend(descs.iter().map(|desc| {
            DisplayMode::new(
                desc.Width,
                desc.Height,
                desc.RefreshRate.Numerator,
                desc.RefreshRate.Denominator,
            )
        }));
    }

    if output_index == 0 {
        None
    } else {
        Some(modes)
    }
}

/// Enumerate every adapter, register them and return the primary one
pub fn select_adapter(
    factory: &IDXGIFactory1,
    display_format: Format,
) -> Result<(IDXGIAdapter1, GpuList, Display)> {
    let mut adapters = Vec::new();
    let mut descs = Vec::new();
    let mut index = 0;

    while let Ok(adapter) = unsafe { factory.EnumAdapters1(index) } {
        index += 1;
        let desc = match unsafe { adapter.GetDesc1() } {
            Ok(desc) => desc,
            Err(e) => {
                engine_warn!(SOURCE, "Skipping adapter {}: {}", index - 1, e.message());
                continue;
            }
        };

        let software = (desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0;
        let memory_bytes = desc.DedicatedVideoMemory as u64;
        let handle = luid_to_handle(desc.AdapterLuid.LowPart, desc.AdapterLuid.HighPart);

        descs.push(AdapterDesc {
            vendor_id: desc.VendorId,
            name: adapter_name(&desc.Description),
            memory_bytes,
            gpu_type: gpu_type_from_adapter(software, memory_bytes),
            handle: AdapterHandle(handle),
            display_modes: adapter_display_modes(&adapter, display_format),
        });
        adapters.push((handle, adapter));
    }

    let (gpus, display) = register_adapters(descs)?;
    let primary = gpus.primary().ok_or(Error::NoAdapter)?;
    let adapter = adapters
        .into_iter()
        .find(|(handle, _)| *handle == primary.handle().0)
        .map(|(_, adapter)| adapter)
        .ok_or(Error::NoAdapter)?;

    Ok((adapter, gpus, display))
}

/// Direct3D 12 device
///
/// [`D3D12Context`] holds the device, the direct queue with its fence, and
/// the CPU descriptor heaps every view of the device is allocated from.

use std::any::Any;
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use aurora_rhi::aurora::{Error, Result};
use aurora_rhi::aurora::rhi::{
    BlendState, BlendStateDesc, CommandList, DepthStencilState, DepthStencilStateDesc, Device,
    DeviceConfig, DeviceLimits, Display, GpuList, RasterizerState, RasterizerStateDesc, RenderApi,
    Swapchain, SwapchainDesc, Texture, TextureDesc, WindowTarget,
};
use aurora_rhi::{engine_debug, engine_err, engine_info, engine_warn};
use windows::core::{Interface, HSTRING};
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL;
use windows::Win32::Graphics::Direct3D12::{
    D3D12CreateDevice, D3D12GetDebugInterface, ID3D12CommandAllocator, ID3D12CommandList,
    ID3D12CommandQueue, ID3D12Debug, ID3D12DescriptorHeap, ID3D12Device, ID3D12Fence,
    ID3D12GraphicsCommandList, ID3D12Object, ID3D12PipelineState, ID3D12Resource,
    D3D12_COMMAND_LIST_TYPE_DIRECT, D3D12_COMMAND_QUEUE_DESC, D3D12_COMMAND_QUEUE_FLAG_NONE,
    D3D12_CPU_DESCRIPTOR_HANDLE, D3D12_DESCRIPTOR_HEAP_DESC, D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
    D3D12_DESCRIPTOR_HEAP_TYPE, D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
    D3D12_DESCRIPTOR_HEAP_TYPE_DSV, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, D3D12_FENCE_FLAG_NONE,
    D3D12_RESOURCE_BARRIER, D3D12_RESOURCE_BARRIER_0, D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
    D3D12_RESOURCE_BARRIER_FLAG_NONE, D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
    D3D12_RESOURCE_STATES, D3D12_RESOURCE_TRANSITION_BARRIER,
};
use windows::Win32::Graphics::Dxgi::{IDXGIAdapter1, IDXGIFactory1};

use crate::d3d12_command_list::D3D12CommandList;
use crate::d3d12_state::{D3D12BlendState, D3D12DepthStencilState, D3D12RasterizerState};
use crate::d3d12_swapchain::D3D12Swapchain;
use crate::d3d12_texture::D3D12Texture;
use crate::descriptor_slots::DescriptorSlots;
use crate::dxgi::{self, hr_error, init_error};
use crate::dxgi_tables::{feature_level_name, max_texture_dimension, D3D12_FEATURE_LEVELS};

pub(crate) const SOURCE: &str = "aurora::d3d12";

const RTV_HEAP_SIZE: u32 = 256;
const DSV_HEAP_SIZE: u32 = 256;
const SRV_UAV_HEAP_SIZE: u32 = 1024;

// ===== DESCRIPTOR HEAPS =====

/// One descriptor of a [`DescriptorHeap`]
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub handle: D3D12_CPU_DESCRIPTOR_HANDLE,
    slot: u32,
}

/// Non-shader-visible heap handing out single descriptors
pub struct DescriptorHeap {
    heap: ID3D12DescriptorHeap,
    start: usize,
    increment: usize,
    slots: Mutex<DescriptorSlots>,
    kind: &'static str,
}

impl DescriptorHeap {
    fn new(device: &ID3D12Device, heap_type: D3D12_DESCRIPTOR_HEAP_TYPE, capacity: u32, kind: &'static str) -> Result<Self> {
        let desc = D3D12_DESCRIPTOR_HEAP_DESC {
            Type: heap_type,
            NumDescriptors: capacity,
            Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
            NodeMask: 0,
        };
        let heap: ID3D12DescriptorHeap = unsafe { device.CreateDescriptorHeap(&desc) }
            .map_err(|e| init_error(SOURCE, "Failed to create descriptor heap", e))?;
        let start = unsafe { heap.GetCPUDescriptorHandleForHeapStart() }.ptr;
        let increment = unsafe { device.GetDescriptorHandleIncrementSize(heap_type) } as usize;

        Ok(Self {
            heap,
            start,
            increment,
            slots: Mutex::new(DescriptorSlots::new(capacity)),
            kind,
        })
    }

    pub fn allocate(&self) -> Result<Descriptor> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| engine_err!(SOURCE, "{} descriptor heap mutex poisoned", self.kind))?;
        let slot = slots.alloc().ok_or_else(|| {
            engine_err!(SOURCE, "{} descriptor heap is full ({} descriptors)", self.kind, slots.capacity())
        })?;
        Ok(Descriptor {
            handle: D3D12_CPU_DESCRIPTOR_HANDLE { ptr: self.start + slot as usize * self.increment },
            slot,
        })
    }

    pub fn free(&self, descriptor: Descriptor) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.free(descriptor.slot);
        }
    }

    pub fn native(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }
}

// ===== CONTEXT =====

/// Native objects shared by a D3D12 device and its children
pub struct D3D12Context {
    pub device: ID3D12Device,
    pub queue: ID3D12CommandQueue,
    pub factory: IDXGIFactory1,
    pub feature_level: D3D_FEATURE_LEVEL,
    pub tearing_supported: bool,
    pub rtv_heap: DescriptorHeap,
    pub dsv_heap: DescriptorHeap,
    pub srv_uav_heap: DescriptorHeap,
    fence: ID3D12Fence,
    fence_value: AtomicU64,
}

impl D3D12Context {
    /// Signal the queue fence and return the value to wait for
    pub fn signal(&self) -> Result<u64> {
        let value = self.fence_value.fetch_add(1, Ordering::SeqCst) + 1;
        unsafe { self.queue.Signal(&self.fence, value) }
            .map_err(|e| hr_error(SOURCE, "Failed to signal the queue fence", e))?;
        Ok(value)
    }

    /// Block until the queue fence reaches `value`
    pub fn wait_for(&self, value: u64) -> Result<()> {
        if unsafe { self.fence.GetCompletedValue() } >= value {
            return Ok(());
        }
        // A null event makes the call itself block
        unsafe { self.fence.SetEventOnCompletion(value, HANDLE::default()) }
            .map_err(|e| hr_error(SOURCE, "Failed to wait for the queue fence", e))
    }

    pub fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    pub fn wait_idle(&self) -> Result<()> {
        let value = self.signal()?;
        self.wait_for(value)
    }

    pub fn execute(&self, list: &ID3D12GraphicsCommandList) -> Result<u64> {
        let list: ID3D12CommandList = list
            .cast()
            .map_err(|e| hr_error(SOURCE, "Command list is not an ID3D12CommandList", e))?;
        unsafe {
            self.queue.ExecuteCommandLists(&[Some(list)]);
        }
        self.signal()
    }

    /// Record, execute and wait for a one-shot command list
    pub fn immediate_submit<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ID3D12GraphicsCommandList) -> Result<()>,
    {
        let allocator: ID3D12CommandAllocator = unsafe { self.device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }
            .map_err(|e| hr_error(SOURCE, "Failed to create upload command allocator", e))?;
        let list: ID3D12GraphicsCommandList = unsafe {
            self.device.CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &allocator, None::<&ID3D12PipelineState>)
        }
        .map_err(|e| hr_error(SOURCE, "Failed to create upload command list", e))?;

        record(&list)?;
        unsafe { list.Close() }.map_err(|e| hr_error(SOURCE, "Failed to close upload command list", e))?;

        let value = self.execute(&list)?;
        self.wait_for(value)
    }

    /// Attach a debug name to a D3D12 object (visible in PIX and the debug layer)
    pub fn set_debug_name<T: Interface>(&self, object: &T, name: &str) {
        if name.is_empty() {
            return;
        }
        let Ok(object) = object.cast::<ID3D12Object>() else {
            return;
        };
        if let Err(e) = unsafe { object.SetName(&HSTRING::from(name)) } {
            engine_warn!(SOURCE, "Failed to set debug name '{}': {}", name, e.message());
        }
    }
}

impl Drop for D3D12Context {
    fn drop(&mut self) {
        // Resources released after this must not be in flight
        if let Err(e) = self.wait_idle() {
            engine_warn!(SOURCE, "Queue did not drain before device destruction: {}", e);
        }
    }
}

/// Transition barrier over every subresource of `resource`
pub(crate) fn transition_barrier(
    resource: &ID3D12Resource,
    before: D3D12_RESOURCE_STATES,
    after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                // Borrowed without an AddRef; the barrier never outlives the call
                pResource: unsafe { std::mem::transmute_copy(resource) },
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: before,
                StateAfter: after,
            }),
        },
    }
}

// ===== DEVICE =====

/// Direct3D 12 implementation of the RHI device
pub struct D3D12Device {
    context: Arc<D3D12Context>,
    gpus: GpuList,
    display: Display,
    limits: DeviceLimits,
}

impl D3D12Device {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        if config.enable_debug_layer {
            enable_debug_layer();
        }
        if config.enable_multithread_protection {
            engine_debug!(SOURCE, "D3D12 devices are free-threaded, multithread protection has no effect");
        }

        let factory = dxgi::create_factory()?;
        let (adapter, gpus, display) = dxgi::select_adapter(&factory, config.display_format)?;
        let (device, feature_level) = create_device(&adapter)?;

        let queue_desc = D3D12_COMMAND_QUEUE_DESC {
            Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
            Priority: 0,
            Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
            NodeMask: 0,
        };
        let queue: ID3D12CommandQueue = unsafe { device.CreateCommandQueue(&queue_desc) }
            .map_err(|e| init_error(SOURCE, "Failed to create the direct queue", e))?;
        let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE) }
            .map_err(|e| init_error(SOURCE, "Failed to create the queue fence", e))?;

        let rtv_heap = DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, RTV_HEAP_SIZE, "RTV")?;
        let dsv_heap = DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, DSV_HEAP_SIZE, "DSV")?;
        let srv_uav_heap =
            DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV, SRV_UAV_HEAP_SIZE, "CBV/SRV/UAV")?;

        let tearing_supported = dxgi::tearing_supported(&factory);
        let limits = DeviceLimits {
            max_texture_dimension_2d: max_texture_dimension(feature_level.0),
        };

        if let Some(gpu) = gpus.primary() {
            engine_info!(
                SOURCE,
                "Device created on {} ({} MB, feature level {})",
                gpu.name(),
                gpu.memory_mb(),
                feature_level_name(feature_level.0)
            );
        }

        let context = D3D12Context {
            device,
            queue,
            factory,
            feature_level,
            tearing_supported,
            rtv_heap,
            dsv_heap,
            srv_uav_heap,
            fence,
            fence_value: AtomicU64::new(0),
        };
        context.set_debug_name(&context.queue, "Direct queue");

        Ok(Self { context: Arc::new(context), gpus, display, limits })
    }

    pub fn context(&self) -> &Arc<D3D12Context> {
        &self.context
    }
}

/// Enable the debug layer before the device exists, or warn when it is missing
fn enable_debug_layer() {
    let mut debug: Option<ID3D12Debug> = None;
    match unsafe { D3D12GetDebugInterface(&mut debug) } {
        Ok(()) => {
            if let Some(debug) = debug {
                unsafe { debug.EnableDebugLayer() };
                engine_debug!(SOURCE, "D3D12 debug layer enabled");
            }
        }
        Err(e) => {
            engine_warn!(SOURCE, "D3D12 debug layer unavailable, continuing without it: {}", e.message());
        }
    }
}

/// Create the device at the highest supported feature level
fn create_device(adapter: &IDXGIAdapter1) -> Result<(ID3D12Device, D3D_FEATURE_LEVEL)> {
    let mut last_error = None;
    for level in D3D12_FEATURE_LEVELS {
        let level = D3D_FEATURE_LEVEL(level);
        let mut device: Option<ID3D12Device> = None;
        match unsafe { D3D12CreateDevice(adapter, level, &mut device) } {
            Ok(()) => {
                if let Some(device) = device {
                    return Ok((device, level));
                }
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(init_error(SOURCE, "D3D12CreateDevice failed at every feature level", e)),
        None => Err(Error::InitializationFailed("D3D12CreateDevice returned no device".to_string())),
    }
}

impl Device for D3D12Device {
    fn render_api(&self) -> RenderApi {
        RenderApi::DirectX12
    }

    fn gpus(&self) -> &GpuList {
        &self.gpus
    }

    fn display(&self) -> &Display {
        &self.display
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc, window: &WindowTarget) -> Result<Box<dyn Swapchain>> {
        desc.validate()?;
        if !self.is_valid_resolution(desc.width, desc.height) {
            return Err(Error::InvalidArgument(format!(
                "swapchain size {}x{} is outside 1..={}",
                desc.width, desc.height, self.limits.max_texture_dimension_2d
            )));
        }
        Ok(Box::new(D3D12Swapchain::new(Arc::clone(&self.context), desc, window, self.limits)?))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>> {
        if !self.is_valid_resolution(desc.width, desc.height) {
            return Err(Error::InvalidArgument(format!(
                "texture '{}' size {}x{} is outside 1..={}",
                desc.debug_name, desc.width, desc.height, self.limits.max_texture_dimension_2d
            )));
        }
        Ok(Box::new(D3D12Texture::new(Arc::clone(&self.context), desc)?))
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Box<dyn RasterizerState>> {
        Ok(Box::new(D3D12RasterizerState::new(desc)))
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Box<dyn DepthStencilState>> {
        Ok(Box::new(D3D12DepthStencilState::new(desc)))
    }

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Box<dyn BlendState>> {
        Ok(Box::new(D3D12BlendState::new(desc)))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(D3D12CommandList::new(Arc::clone(&self.context))?))
    }

    fn submit(&mut self, command_list: &mut dyn CommandList, _swapchain: Option<&dyn Swapchain>) -> Result<()> {
        let cmd = command_list
            .as_any_mut()
            .downcast_mut::<D3D12CommandList>()
            .ok_or_else(|| Error::InvalidResource("command list was not created by the D3D12 device".to_string()))?;
        if cmd.is_recording() {
            return Err(Error::InvalidArgument("submit called on a command list still recording".to_string()));
        }
        if !cmd.is_ready() {
            return Err(Error::InvalidArgument("command list has nothing recorded".to_string()));
        }

        let value = self.context.execute(cmd.native())?;
        cmd.mark_submitted(value);
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.context.wait_idle()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

use core::mem::MaybeUninit;

use macropad_core::boot::Bootloader;
use stm32f4xx_hal::pac;

const BOOTLOADER_REQUEST_MAGIC: u32 = 0xb007_10ad;

// Base address of the system memory, where the ROM bootloader lives.
const SYSTEM_MEMORY_BASE: u32 = 0x1fff_0000;

// Survives a core reset, since it is not zeroed by the runtime.
#[unsafe(link_section = ".uninit.BOOTLOADER_REQUEST")]
static mut BOOTLOADER_REQUEST: MaybeUninit<u32> = MaybeUninit::uninit();

/// Enters the ROM bootloader of the chip.
///
/// Jumping straight into it from a running firmware is unreliable,
/// since the bootloader expects the peripherals in their reset state.
/// Instead, a request is left in a RAM word that is not initialized
/// at startup and the core is reset; the new boot then handles the
/// request before touching any peripheral.
pub struct BootloaderUtil;

impl BootloaderUtil {
    /// Leaves the bootloader request and resets the core.
    pub fn request_bootloader() -> ! {
        unsafe {
            (&raw mut BOOTLOADER_REQUEST)
                .cast::<u32>()
                .write_volatile(BOOTLOADER_REQUEST_MAGIC);
        }
        cortex_m::peripheral::SCB::sys_reset()
    }

    /// Jumps into the bootloader if it was requested before the last
    /// reset. Otherwise, does nothing.
    ///
    /// # Safety
    ///
    /// Must be called at the very beginning of `main`, before any
    /// clock or peripheral has been configured.
    pub unsafe fn handle_bootloader_enter_request() {
        let request = (&raw mut BOOTLOADER_REQUEST).cast::<u32>();
        let requested = unsafe { request.read_volatile() } == BOOTLOADER_REQUEST_MAGIC;
        if !requested {
            return;
        }

        unsafe {
            request.write_volatile(0);

            let rcc = &*pac::RCC::ptr();
            rcc.apb2enr().modify(|_, w| w.syscfgen().set_bit());

            // Map the system memory at address 0.
            let syscfg = &*pac::SYSCFG::ptr();
            syscfg.memrm().modify(|_, w| w.mem_mode().bits(0b01));

            cortex_m::asm::bootload(SYSTEM_MEMORY_BASE as *const u32)
        }
    }
}

/// The [`Bootloader`] of the boot gate, backed by the ROM bootloader.
pub struct SystemBootloader;

impl Bootloader for SystemBootloader {
    fn enter(&mut self) -> ! {
        BootloaderUtil::request_bootloader()
    }
}

use super::{ClassToken, Disposal, IndicatorBackend, LoopRequest, NativeHandle, NativeIconResource, TraySpec};
use crate::error::{NativeError, ERROR_INVALID_WINDOW_HANDLE};
use std::cell::RefCell;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};
use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};
use tray_icon::{TrayIcon, TrayIconBuilder};
use windows_sys::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    GetWindowThreadProcessId, IsWindow, PeekMessageW, PostMessageW, PostQuitMessage,
    RegisterClassW, TranslateMessage, UnregisterClassW, HWND_MESSAGE, MSG, PM_REMOVE, WM_CLOSE,
    WM_DESTROY, WM_QUIT, WNDCLASSW,
};

thread_local! {
    // The visible icon must be created and dropped on the loop's thread.
    static TRAY_ICON: RefCell<Option<TrayIcon>> = const { RefCell::new(None) };
}

pub struct Win32Indicator {
    next_class: AtomicU32,
}

impl Win32Indicator {
    pub fn new() -> Self {
        Self {
            next_class: AtomicU32::new(0),
        }
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn hwnd(handle: NativeHandle) -> HWND {
    handle.0 as HWND
}

fn last_error(op: &'static str) -> NativeError {
    let code = unsafe { GetLastError() };
    if code == ERROR_INVALID_WINDOW_HANDLE {
        NativeError::InvalidHandle
    } else {
        NativeError::Os { op, code }
    }
}

fn owned_by_current_thread(window: HWND) -> bool {
    unsafe { GetWindowThreadProcessId(window, ptr::null_mut()) == GetCurrentThreadId() }
}

unsafe extern "system" fn indicator_wndproc(
    window: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_DESTROY {
        PostQuitMessage(0);
        return 0;
    }
    DefWindowProcW(window, msg, wparam, lparam)
}

fn build_tray_icon(spec: &TraySpec) -> anyhow::Result<TrayIcon> {
    let menu = Menu::new();
    menu.append(&MenuItem::with_id(crate::menu::SHOW_ID, "Show", true, None))?;
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&MenuItem::with_id(crate::menu::QUIT_ID, "Quit", true, None))?;

    let tray_icon = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(&spec.tooltip)
        .with_icon(super::icon::create_icon()?)
        .build()?;
    Ok(tray_icon)
}

impl IndicatorBackend for Win32Indicator {
    fn open(&self, spec: &TraySpec) -> Result<NativeIconResource, NativeError> {
        let serial = self.next_class.fetch_add(1, Ordering::SeqCst);
        let class_name = wide(&format!("TagSnapIndicator{}", serial));
        let title = wide(&spec.tooltip);

        unsafe {
            let instance = GetModuleHandleW(ptr::null());
            let class = WNDCLASSW {
                style: 0,
                lpfnWndProc: Some(indicator_wndproc),
                cbClsExtra: 0,
                cbWndExtra: 0,
                hInstance: instance,
                hIcon: ptr::null_mut(),
                hCursor: ptr::null_mut(),
                hbrBackground: ptr::null_mut(),
                lpszMenuName: ptr::null(),
                lpszClassName: class_name.as_ptr(),
            };
            let atom = RegisterClassW(&class);
            if atom == 0 {
                return Err(last_error("RegisterClassW"));
            }

            let window = CreateWindowExW(
                0,
                atom as usize as *const u16,
                title.as_ptr(),
                0,
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                ptr::null_mut(),
                instance,
                ptr::null(),
            );
            if window.is_null() {
                let error = last_error("CreateWindowExW");
                UnregisterClassW(atom as usize as *const u16, instance);
                return Err(error);
            }

            match build_tray_icon(spec) {
                Ok(icon) => TRAY_ICON.with(|slot| *slot.borrow_mut() = Some(icon)),
                Err(e) => {
                    DestroyWindow(window);
                    UnregisterClassW(atom as usize as *const u16, instance);
                    return Err(NativeError::Unavailable(e.to_string()));
                }
            }

            Ok(NativeIconResource {
                handle: NativeHandle(window as isize),
                class: ClassToken(atom),
            })
        }
    }

    fn run_loop(&self, handle: NativeHandle) -> Result<(), NativeError> {
        let window = hwnd(handle);
        if unsafe { IsWindow(window) } == 0 {
            return Err(NativeError::InvalidHandle);
        }
        if !owned_by_current_thread(window) {
            return Err(NativeError::LoopAlreadyRunning);
        }

        let result = unsafe {
            let mut msg: MSG = std::mem::zeroed();
            loop {
                match GetMessageW(&mut msg, ptr::null_mut(), 0, 0) {
                    0 => break Ok(()),
                    -1 => break Err(last_error("GetMessageW")),
                    _ => {
                        TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
            }
        };

        TRAY_ICON.with(|slot| slot.borrow_mut().take());
        result
    }

    fn post(&self, handle: NativeHandle, request: LoopRequest) -> Result<(), NativeError> {
        let msg = match request {
            LoopRequest::Close => WM_CLOSE,
            LoopRequest::Quit => WM_QUIT,
        };
        if unsafe { PostMessageW(hwnd(handle), msg, 0, 0) } == 0 {
            return Err(last_error("PostMessageW"));
        }
        Ok(())
    }

    fn drain_current_thread(&self) -> Result<usize, NativeError> {
        let mut handled = 0;
        unsafe {
            let mut msg: MSG = std::mem::zeroed();
            while PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) != 0 {
                if msg.message == WM_QUIT {
                    // Not ours to consume; hand it back to this thread's loop.
                    PostQuitMessage(msg.wParam as i32);
                    break;
                }
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
                handled += 1;
            }
        }
        Ok(handled)
    }

    fn destroy(&self, handle: NativeHandle) -> Result<Disposal, NativeError> {
        let window = hwnd(handle);
        unsafe {
            if IsWindow(window) == 0 {
                return Err(NativeError::InvalidHandle);
            }
            if !owned_by_current_thread(window) {
                // DestroyWindow only works on the owning thread; WM_CLOSE makes
                // that thread destroy it.
                if PostMessageW(window, WM_CLOSE, 0, 0) == 0 {
                    return Err(last_error("PostMessageW"));
                }
                return Ok(Disposal::Deferred);
            }
            if DestroyWindow(window) == 0 {
                return Err(last_error("DestroyWindow"));
            }
        }
        Ok(Disposal::Destroyed)
    }

    fn unregister(&self, class: ClassToken) -> Result<(), NativeError> {
        unsafe {
            let instance = GetModuleHandleW(ptr::null());
            if UnregisterClassW(class.0 as usize as *const u16, instance) == 0 {
                return Err(last_error("UnregisterClassW"));
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    shapegl::app_main();
}

// the browser calls `appMain` from the cdylib instead
#[cfg(target_arch = "wasm32")]
fn main() {}

use std::env;

fn main() {
    // AVR link arguments only apply when cross-building for the MCU; the
    // executive core itself builds and tests on the host.
    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega128");
        println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");
    }
}

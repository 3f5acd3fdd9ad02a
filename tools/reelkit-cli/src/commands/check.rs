//! Check encoder format support.

use reelkit_recorder::simulated::SimulatedEncoderFactory;
use reelkit_recorder::{select_format, EncoderFactory, PREFERRED_FORMATS};

pub fn run() -> anyhow::Result<()> {
    println!("ReelKit Format Check");
    println!("{}", "=".repeat(50));

    let factory = SimulatedEncoderFactory::new();
    for format in &PREFERRED_FORMATS {
        let supported = factory.supports(format);
        println!(
            "[{}] {}",
            if supported { "OK" } else { "--" },
            format.mime_type()
        );
    }

    match select_format(&factory) {
        Ok(format) => println!("\nSelected format: {}", format.mime_type()),
        Err(e) => println!("\n[FAIL] {e}"),
    }

    Ok(())
}

#[macro_use]
extern crate log;

use std::{env, fs};

use env_logger::Env;

use bmp_support::writer::BMPWriter;
use gif2bmp_core::models::{ImageReader, ImageWriter};
use gif_support::reader::GIFReader;

const DEFAULT_LOGGING_LEVEL: &str = "info";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();
    let args: Vec<String> = env::args().collect();
    debug!("args are: {:?}", args);

    if argument_present(&args, "source") && argument_present(&args, "output") {
        let source = argument_value(&args, "source")
            .expect("expected source file to be present because checked that argument is present");
        let output = argument_value(&args, "output")
            .expect("expected output file to be present because checked that argument is present");

        convert_file(&source, &output);
    } else {
        error!("please specify source and output files:\nconverter --source=example.gif --output=example.bmp");
    }
}

fn convert_file(from_file: &str, to_file: &str) {
    info!("Converting file {} to {}", from_file, to_file);

    let file = match fs::read(&from_file) {
        Ok(v) => v,
        Err(err) => {
            error!("failed to read {}: {}", &from_file, err);
            return;
        }
    };

    let image = match GIFReader::new().read(&file) {
        Ok(v) => v,
        Err(err) => {
            error!("Failed to read image as gif: {}", err);
            return;
        }
    };

    info!("done reading a {}x{} image", image.width, image.height);

    let converted = match BMPWriter::new().write(&image) {
        Ok(v) => v,
        Err(err) => {
            error!("Failed to convert image to bmp: {}", err);
            return;
        }
    };

    match fs::write(&to_file, &converted) {
        Ok(_) => info!("Result saved to {}", to_file),
        Err(err) => error!("Failed to save result: {}", err),
    }
}

fn argument_value(args: &Vec<String>, argument_name: &str) -> Option<String> {
    args.iter()
        .find(|s| s.starts_with(&format!("--{}=", argument_name)))
        .map(|s| s[s.find("=").expect("expected equals sign to be present because checked for that in filter")+1..].to_string())
}

fn argument_present(args: &Vec<String>, argument_name: &str) -> bool {
    args.iter().find(|s| s.starts_with(&format!("--{}=", argument_name))).is_some()
}

use byteorder::{ByteOrder, LittleEndian};
use custom_error::custom_error;

use gif2bmp_core::models::{Image, ImageIOError, ImageWriter};

custom_error! {pub BMPWriterError
    InvalidImage {description: String} = "Invalid image: {description}",
}

const FILE_HEADER_SIZE: usize = 14;
const DIB_HEADER_SIZE: usize = 40;
const PIXEL_DATA_OFFSET: usize = FILE_HEADER_SIZE + DIB_HEADER_SIZE;

// 0xB13 pixels per meter, roughly 72 DPI
const RESOLUTION_PPM: u32 = 0xB13;

pub struct BMPWriter {
}

impl BMPWriter {

    pub fn new() -> Self {
        BMPWriter {}
    }
}

impl ImageWriter for BMPWriter {

    fn write(&self, image: &Image) -> Result<Vec<u8>, ImageIOError> {
        write_bmp(image).map_err(|err| ImageIOError::FailedToWrite {
            description: format!("failed to write bmp: {}", err),
        })
    }
}

fn write_bmp(image: &Image) -> Result<Vec<u8>, BMPWriterError> {
    if image.pixels.len() != image.width * image.height {
        return Err(BMPWriterError::InvalidImage {
            description: format!(
                "{}x{} image with {} pixels",
                image.width, image.height, image.pixels.len()
            ),
        });
    }

    let mut data = Vec::new();

    // BITMAPFILEHEADER
    data.extend_from_slice(b"BM");
    push_u32(&mut data, 0); // file size, patched once the pixel data is written
    push_u16(&mut data, 0); // reserved
    push_u16(&mut data, 0); // reserved
    push_u32(&mut data, PIXEL_DATA_OFFSET as u32);

    // BITMAPINFOHEADER
    push_u32(&mut data, DIB_HEADER_SIZE as u32);
    push_u32(&mut data, image.width as u32);
    push_u32(&mut data, image.height as u32);
    push_u16(&mut data, 1); // color planes
    push_u16(&mut data, 24); // bits per pixel
    push_u32(&mut data, 0); // compression: uncompressed
    push_u32(&mut data, 0); // pixel data size, may be zero for uncompressed images
    push_u32(&mut data, RESOLUTION_PPM);
    push_u32(&mut data, RESOLUTION_PPM);
    push_u32(&mut data, 0); // palette size
    push_u32(&mut data, 0); // important colors

    // Pixel data goes bottom-up, BGR, every scan line padded to 4 bytes.
    let padding = (4 - (image.width * 3) % 4) % 4;
    for y in 0..image.height {
        for x in 0..image.width {
            let pixel = image.get_pixel_bottom_left_origin(x, y);
            data.push(pixel.blue);
            data.push(pixel.green);
            data.push(pixel.red);
        }

        data.extend_from_slice(&vec![0; padding]);
    }

    let file_size = data.len() as u32;
    LittleEndian::write_u32(&mut data[2..6], file_size);

    Ok(data)
}

fn push_u16(data: &mut Vec<u8>, value: u16) {
    let mut bytes = [0; 2];
    LittleEndian::write_u16(&mut bytes, value);
    data.extend_from_slice(&bytes);
}

fn push_u32(data: &mut Vec<u8>, value: u32) {
    let mut bytes = [0; 4];
    LittleEndian::write_u32(&mut bytes, value);
    data.extend_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use gif2bmp_core::models::Pixel;

    use super::*;

    fn two_by_two_image() -> Image {
        let mut image = Image::new(2, 2);
        image.set_pixel(0, 0, Pixel::from_rgb(1, 2, 3));
        image.set_pixel(1, 0, Pixel::from_rgb(4, 5, 6));
        image.set_pixel(0, 1, Pixel::from_rgb(7, 8, 9));
        image.set_pixel(1, 1, Pixel::from_rgb(10, 11, 12));
        image
    }

    #[test]
    fn test_write_headers() {
        let data = BMPWriter::new().write(&two_by_two_image())
            .expect("failed to write bmp");

        assert_eq!(&data[0..2], b"BM");
        assert_eq!(LittleEndian::read_u32(&data[2..6]) as usize, data.len());
        assert_eq!(LittleEndian::read_u32(&data[10..14]), 54);
        assert_eq!(LittleEndian::read_u32(&data[14..18]), 40);
        assert_eq!(LittleEndian::read_u32(&data[18..22]), 2);
        assert_eq!(LittleEndian::read_u32(&data[22..26]), 2);
        assert_eq!(LittleEndian::read_u16(&data[26..28]), 1);
        assert_eq!(LittleEndian::read_u16(&data[28..30]), 24);
        assert_eq!(LittleEndian::read_u32(&data[30..34]), 0);
    }

    #[test]
    fn test_write_pixels_bottom_up_bgr() {
        let data = BMPWriter::new().write(&two_by_two_image())
            .expect("failed to write bmp");

        // 2 rows of 6 pixel bytes padded to 8
        assert_eq!(data.len(), 54 + 16);

        // bottom row first: (0, 1) and (1, 1), blue channel leading
        assert_eq!(&data[54..60], &[9, 8, 7, 12, 11, 10]);
        assert_eq!(&data[60..62], &[0, 0]);
        assert_eq!(&data[62..68], &[3, 2, 1, 6, 5, 4]);
        assert_eq!(&data[68..70], &[0, 0]);
    }

    #[test]
    fn test_row_padding_alignment() {
        let mut image = Image::new(3, 1);
        image.fill(Pixel::white());

        let data = BMPWriter::new().write(&image)
            .expect("failed to write bmp");

        // 9 pixel bytes padded to 12
        assert_eq!(data.len(), 54 + 12);
        assert_eq!(&data[63..66], &[0, 0, 0]);
    }

    #[test]
    fn test_width_multiple_of_four_needs_no_padding() {
        let mut image = Image::new(4, 1);
        image.fill(Pixel::white());

        let data = BMPWriter::new().write(&image)
            .expect("failed to write bmp");

        assert_eq!(data.len(), 54 + 12);
    }

    #[test]
    fn test_inconsistent_image_is_rejected() {
        let image = Image::from_pixels(2, 2, vec![Pixel::black(); 3]);

        let result = BMPWriter::new().write(&image);
        assert!(matches!(result, Err(ImageIOError::FailedToWrite { .. })));
    }
}

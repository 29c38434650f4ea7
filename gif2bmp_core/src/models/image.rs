use super::pixel::Pixel;

#[derive(Clone)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Pixel>, // starting at top left pixel of the image, pos = y * width + x
}

impl Image {

    pub fn new(width: usize, height: usize) -> Self {
        Image {
            width,
            height,
            pixels: vec![Pixel::zero(); width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Self {
        Image {
            width,
            height,
            pixels,
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.pixels[y * self.width + x] = pixel;
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.width + x]
    }

    pub fn set_pixel_bottom_left_origin(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.set_pixel(x, self.height - 1 - y, pixel)
    }

    pub fn get_pixel_bottom_left_origin(&self, x: usize, y: usize) -> Pixel {
        self.get_pixel(x, self.height - 1 - y)
    }

    pub fn fill(&mut self, color: Pixel) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_accessors() {
        let mut image = Image::new(3, 2);
        image.set_pixel(2, 1, Pixel::from_rgb(1, 2, 3));

        assert_eq!(image.get_pixel(2, 1), Pixel::from_rgb(1, 2, 3));
        assert_eq!(image.get_pixel(0, 0), Pixel::black());
        assert_eq!(image.get_pixel_bottom_left_origin(2, 0), Pixel::from_rgb(1, 2, 3));
    }

    #[test]
    fn test_fill() {
        let mut image = Image::new(2, 2);
        image.fill(Pixel::white());

        assert_eq!(image.pixels, vec![Pixel::white(); 4]);
    }
}

use custom_error::custom_error;

custom_error! {pub GIFReaderError
    TruncatedInput {description: String} = "Truncated input: {description}",
    BadSignature {description: String} = "Bad signature: {description}",
    UnknownBlock {description: String} = "Unknown block: {description}",
    UnsupportedExtension {description: String} = "Unsupported extension: {description}",
    MalformedPalette {description: String} = "Malformed palette: {description}",
    LzwProtocolViolation {description: String} = "LZW protocol violation: {description}",
    PaletteIndexOutOfRange {description: String} = "Palette index out of range: {description}",
}

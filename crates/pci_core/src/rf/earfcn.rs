//! EARFCN to centre-frequency conversion for the LTE bands seen in the field.

const CHANNEL_RASTER_MHZ: f64 = 0.1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Link {
    Downlink,
    Uplink,
}

struct Band {
    number: u16,
    dl_low_mhz: f64,
    ul_low_mhz: f64,
    first: u32,
    last: u32,
}

const fn band(number: u16, dl_low_mhz: f64, ul_low_mhz: f64, first: u32, last: u32) -> Band {
    Band {
        number,
        dl_low_mhz,
        ul_low_mhz,
        first,
        last,
    }
}

const BANDS: &[Band] = &[
    band(1, 2110.0, 1920.0, 0, 599),
    band(2, 1930.0, 1850.0, 600, 1199),
    band(3, 1805.0, 1710.0, 1200, 1949),
    band(4, 2110.0, 1710.0, 1950, 2399),
    band(5, 869.0, 824.0, 2400, 2649),
    band(7, 2620.0, 2500.0, 2750, 3449),
    band(8, 925.0, 880.0, 3450, 3799),
    band(12, 729.0, 699.0, 5010, 5179),
    band(13, 746.0, 777.0, 5180, 5279),
    band(14, 758.0, 788.0, 5280, 5379),
    band(17, 734.0, 704.0, 5730, 5849),
    band(20, 791.0, 832.0, 6150, 6449),
    band(25, 1930.0, 1850.0, 8040, 8689),
    band(26, 859.0, 814.0, 8690, 9039),
    band(28, 758.0, 703.0, 9210, 9659),
    band(30, 2350.0, 2305.0, 9770, 9869),
    band(38, 2570.0, 2570.0, 37750, 38249),
    band(40, 2300.0, 2300.0, 38650, 39649),
    band(41, 2496.0, 2496.0, 39650, 41589),
    band(42, 3400.0, 3400.0, 41590, 43589),
    band(43, 3600.0, 3600.0, 43590, 45589),
    // CBRS
    band(48, 3550.0, 3550.0, 55240, 56739),
];

fn find_band(earfcn: u32) -> Option<&'static Band> {
    BANDS
        .iter()
        .find(|band| (band.first..=band.last).contains(&earfcn))
}

/// Operating band for an EARFCN, if it is in the table.
pub fn band_number(earfcn: u32) -> Option<u16> {
    find_band(earfcn).map(|band| band.number)
}

pub fn frequency_mhz(earfcn: u32, link: Link) -> Option<f64> {
    let band = find_band(earfcn)?;
    let low = match link {
        Link::Downlink => band.dl_low_mhz,
        Link::Uplink => band.ul_low_mhz,
    };
    Some(low + f64::from(earfcn - band.first) * CHANNEL_RASTER_MHZ)
}

pub fn downlink_frequency_mhz(earfcn: u32) -> Option<f64> {
    frequency_mhz(earfcn, Link::Downlink)
}

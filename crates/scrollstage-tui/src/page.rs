//! Static page content and its layout in document coordinates.

use scrollstage_core::watcher::{Region, TargetId};

/// Engine units per terminal row; 136px of scroll (the dock offset) is 8 rows
pub const ROW_HEIGHT_PX: f64 = 17.0;

/// Minimum rows a section occupies, so the page has something to scroll
const MIN_SECTION_ROWS: usize = 14;

pub struct Section {
    pub title: &'static str,
    pub body: &'static [&'static str],
    /// Captions cycled by the gallery carousel
    pub slides: &'static [&'static str],
    /// Visible fraction needed before the section lights up
    pub threshold: f64,
}

pub const SECTIONS: &[Section] = &[
    Section {
        title: "Hello, I build things for the web",
        body: &[
            "Developer, tinkerer and occasional shopkeeper.",
            "Scroll down to see what I have been working on.",
        ],
        slides: &[],
        threshold: 0.1,
    },
    Section {
        title: "About me",
        body: &[
            "I enjoy turning rough ideas into small, polished tools.",
            "Most days that means interfaces, some days it means hardware.",
            "Away from the keyboard: coffee, bikes and long walks.",
        ],
        slides: &[],
        threshold: 0.5,
    },
    Section {
        title: "Timeline",
        body: &[
            "2019  Started freelancing",
            "2020  First storefront shipped",
            "2022  Joined a product studio",
            "2024  Opened the online shop",
        ],
        slides: &[],
        threshold: 0.7,
    },
    Section {
        title: "Tech stack",
        body: &[
            "Frontend    component libraries, motion, design systems",
            "Backend     small services, queues, storage",
            "Tooling     build pipelines, testing, automation",
        ],
        slides: &[],
        threshold: 0.3,
    },
    Section {
        title: "Services",
        body: &[
            "Repairs            Fast turnaround on common devices",
            "Custom builds      Parts picked for your budget",
            "Trade-in options   Swap older electronics toward new ones",
        ],
        slides: &[],
        threshold: 0.3,
    },
    Section {
        title: "Products",
        body: &[
            "Mechanical keyboard kit      in stock",
            "USB-C travel hub             in stock",
            "Refurbished laptop           2 left",
            "Desk lamp, warm white        preorder",
        ],
        slides: &[],
        threshold: 0.3,
    },
    Section {
        title: "Gallery",
        body: &[
            "Photos from recent builds rotate here while the section is on screen.",
        ],
        slides: &[
            "Split keyboard, hand-wired, walnut case",
            "Laptop rescued from a coffee spill",
            "Pocket synth in a 3D-printed shell",
            "Workbench after the spring clean-up",
        ],
        threshold: 0.2,
    },
    Section {
        title: "Newsletter",
        body: &[
            "One email a month with new products and write-ups.",
            "No tracking, unsubscribe any time.",
        ],
        slides: &[],
        threshold: 0.3,
    },
    Section {
        title: "Contact",
        body: &["Find me through the buttons in the top-right corner."],
        slides: &[],
        threshold: 0.3,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Title,
    Body(&'static str),
    /// Caption of the current carousel slide
    Slide,
    /// One dot per slide, current one filled
    SlideDots,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRow {
    pub section: usize,
    pub kind: RowKind,
}

/// Sections flattened into rows
#[derive(Debug, Clone)]
pub struct Page {
    rows: Vec<PageRow>,
    regions: Vec<Region>,
}

impl Page {
    pub fn new() -> Self {
        let mut rows = Vec::new();
        let mut regions = Vec::with_capacity(SECTIONS.len());

        for (index, section) in SECTIONS.iter().enumerate() {
            let start = rows.len();
            rows.push(PageRow {
                section: index,
                kind: RowKind::Title,
            });
            rows.push(PageRow {
                section: index,
                kind: RowKind::Blank,
            });
            for line in section.body {
                rows.push(PageRow {
                    section: index,
                    kind: RowKind::Body(line),
                });
            }
            if !section.slides.is_empty() {
                for kind in [RowKind::Blank, RowKind::Slide, RowKind::SlideDots] {
                    rows.push(PageRow {
                        section: index,
                        kind,
                    });
                }
            }
            while rows.len() - start < MIN_SECTION_ROWS {
                rows.push(PageRow {
                    section: index,
                    kind: RowKind::Blank,
                });
            }
            let height = rows.len() - start;
            regions.push(Region::new(
                start as f64 * ROW_HEIGHT_PX,
                height as f64 * ROW_HEIGHT_PX,
            ));
        }

        Self { rows, regions }
    }

    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    pub fn height_rows(&self) -> u16 {
        self.rows.len().min(u16::MAX as usize) as u16
    }

    pub fn height_px(&self) -> f64 {
        self.rows.len() as f64 * ROW_HEIGHT_PX
    }

    pub fn region(&self, section: usize) -> Option<Region> {
        self.regions.get(section).copied()
    }

    /// Index of the section that hosts the carousel
    pub fn gallery_section() -> Option<usize> {
        SECTIONS.iter().position(|s| !s.slides.is_empty())
    }

    pub fn target(section: usize) -> TargetId {
        TargetId(section as u32)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_tile_the_page() {
        let page = Page::new();
        let mut expected_top = 0.0;
        for index in 0..SECTIONS.len() {
            let region = page.region(index).unwrap();
            assert_eq!(region.top, expected_top);
            assert!(region.height >= MIN_SECTION_ROWS as f64 * ROW_HEIGHT_PX);
            expected_top = region.bottom();
        }
        assert_eq!(expected_top, page.height_px());
    }

    #[test]
    fn test_every_section_starts_with_title() {
        let page = Page::new();
        let titles = page
            .rows()
            .iter()
            .filter(|r| r.kind == RowKind::Title)
            .count();
        assert_eq!(titles, SECTIONS.len());
        assert_eq!(page.rows()[0].kind, RowKind::Title);
    }

    #[test]
    fn test_gallery_has_slide_rows() {
        let page = Page::new();
        let gallery = Page::gallery_section().unwrap();
        assert_eq!(SECTIONS[gallery].title, "Gallery");
        assert_eq!(SECTIONS[gallery].threshold, 0.2);

        let slide_rows: Vec<_> = page
            .rows()
            .iter()
            .filter(|r| matches!(r.kind, RowKind::Slide | RowKind::SlideDots))
            .collect();
        assert_eq!(slide_rows.len(), 2);
        assert!(slide_rows.iter().all(|r| r.section == gallery));
    }
}

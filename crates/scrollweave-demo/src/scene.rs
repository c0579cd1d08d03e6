#![forbid(unsafe_code)]

//! The portfolio scene: a synthetic one-page layout and its motion wiring.
//!
//! Sections stack top to bottom: hero (one viewport), about, skills,
//! experience, projects (pinned horizontal gallery plus its spacer),
//! contact, footer. The loader intro is the boot timeline; everything
//! scroll-driven waits for it.

use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use scrollweave_core::{
    AnimatedProperties, BoundaryExpr, Completion, DeviceSignals, Easing, ElementBox, ElementId, LayoutSnapshot,
    LoopCount, PinOptions, Position, ScopeHandle, ScrubBoundaries, Timeline, TimelineStep,
    TriggerHandle, stagger,
};
use scrollweave_web::{IN_VIEW, WebHost};

use crate::error::Result;

pub mod ids {
    use scrollweave_core::ElementId;

    pub const PROGRESS: ElementId = ElementId(1);
    pub const LOADER: ElementId = ElementId(2);
    pub const LOADER_BAR: ElementId = ElementId(3);
    pub const NAV: ElementId = ElementId(4);

    pub const HERO: ElementId = ElementId(10);
    pub const HERO_BG_TEXT: ElementId = ElementId(11);
    pub const HERO_CANVAS: ElementId = ElementId(12);
    pub const HERO_CONTENT: ElementId = ElementId(13);
    pub const HERO_SUBTITLE: ElementId = ElementId(14);
    pub const SCROLL_HINT: ElementId = ElementId(15);
    pub const SCROLL_LINE: ElementId = ElementId(16);

    pub const ABOUT: ElementId = ElementId(20);
    pub const ABOUT_HEADING: ElementId = ElementId(21);
    pub const ABOUT_TEXT: ElementId = ElementId(22);
    pub const ABOUT_STATS: ElementId = ElementId(23);

    pub const SKILLS: ElementId = ElementId(30);
    pub const SKILLS_HEADING: ElementId = ElementId(31);

    pub const EXPERIENCE: ElementId = ElementId(40);
    pub const EXPERIENCE_HEADING: ElementId = ElementId(41);

    pub const PROJECTS: ElementId = ElementId(50);
    pub const PROJECTS_HEADING: ElementId = ElementId(51);
    pub const PROJECTS_TRACK: ElementId = ElementId(52);
    pub const PROJECTS_BAR: ElementId = ElementId(53);

    pub const CONTACT: ElementId = ElementId(60);
    pub const CONTACT_HEADING: ElementId = ElementId(61);

    pub const FOOTER: ElementId = ElementId(70);

    /// Hero title letters.
    pub fn letter(i: u32) -> ElementId {
        ElementId(100 + u64::from(i))
    }
    pub fn stat(i: u32) -> ElementId {
        ElementId(200 + u64::from(i))
    }
    pub fn skill(i: u32) -> ElementId {
        ElementId(300 + u64::from(i))
    }
    pub fn job(i: u32) -> ElementId {
        ElementId(400 + u64::from(i))
    }
    pub fn contact_item(i: u32) -> ElementId {
        ElementId(500 + u64::from(i))
    }
}

use ids::*;

/// Section headings that receive the `in-view` class.
pub const HEADINGS: [ElementId; 5] = [
    ABOUT_HEADING,
    SKILLS_HEADING,
    EXPERIENCE_HEADING,
    PROJECTS_HEADING,
    CONTACT_HEADING,
];
pub const TITLE: &str = "PORTFOLIO";
pub const STATS: u32 = 4;
pub const SKILLS_COUNT: u32 = 6;
pub const JOBS: u32 = 3;
pub const CONTACT_ITEMS: u32 = 3;
/// Gallery width in viewports.
const GALLERY_VIEWPORTS: f64 = 3.0;

/// Measured page geometry for a viewport.
#[derive(Debug, Clone)]
pub struct Scene {
    pub layout: LayoutSnapshot,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

/// What mounting the scene produced.
#[derive(Debug)]
pub struct Mounted {
    pub scope: ScopeHandle,
    pub boot: Completion,
    pub headings: Vec<TriggerHandle>,
}

/// Normal-flow stacking of full-width sections.
struct Flow {
    y: f64,
    width: f64,
    layout: LayoutSnapshot,
}

impl Flow {
    /// Place a section below the previous one; returns its top.
    fn section(&mut self, id: ElementId, height: f64) -> f64 {
        let top = self.y;
        self.layout.insert(id, ElementBox::new(top, 0.0, self.width, height));
        self.y += height;
        top
    }

    fn place(&mut self, id: ElementId, b: ElementBox) {
        self.layout.insert(id, b);
    }
}

impl Scene {
    /// Lay out the page for a `width` x `height` viewport.
    #[must_use]
    pub fn portfolio(width: f64, height: f64) -> Self {
        let mut flow = Flow {
            y: 0.0,
            width,
            layout: LayoutSnapshot::default(),
        };

        flow.place(PROGRESS, ElementBox::new(0.0, 0.0, width, 3.0));
        flow.place(LOADER, ElementBox::new(0.0, 0.0, width, height));
        flow.place(LOADER_BAR, ElementBox::new(height * 0.5, width * 0.3, width * 0.4, 2.0));
        flow.place(NAV, ElementBox::new(0.0, 0.0, width, 72.0));

        let hero = flow.section(HERO, height);
        flow.place(HERO_BG_TEXT, ElementBox::new(hero + height * 0.3, 0.0, width, height * 0.4));
        flow.place(HERO_CANVAS, ElementBox::new(hero, 0.0, width, height));
        flow.place(HERO_CONTENT, ElementBox::new(hero + height * 0.35, 80.0, width - 160.0, 240.0));
        for (i, _) in (0u32..).zip(TITLE.chars()) {
            flow.place(letter(i), ElementBox::new(hero + height * 0.35, 80.0 + 64.0 * f64::from(i), 60.0, 120.0));
        }
        flow.place(HERO_SUBTITLE, ElementBox::new(hero + height * 0.35 + 140.0, 80.0, 600.0, 40.0));
        flow.place(SCROLL_HINT, ElementBox::new(hero + height - 120.0, width * 0.5 - 20.0, 40.0, 80.0));
        flow.place(SCROLL_LINE, ElementBox::new(hero + height - 80.0, width * 0.5, 1.0, 48.0));

        let about = flow.section(ABOUT, 1200.0);
        flow.place(ABOUT_HEADING, ElementBox::new(about + 120.0, 80.0, 800.0, 120.0));
        flow.place(ABOUT_TEXT, ElementBox::new(about + 300.0, 80.0, 700.0, 320.0));
        flow.place(ABOUT_STATS, ElementBox::new(about + 700.0, 80.0, width - 160.0, 200.0));
        for i in 0..STATS {
            flow.place(stat(i), ElementBox::new(about + 700.0, 80.0 + 260.0 * f64::from(i), 240.0, 200.0));
        }

        let skills = flow.section(SKILLS, 1000.0);
        flow.place(SKILLS_HEADING, ElementBox::new(skills + 120.0, 80.0, 800.0, 120.0));
        for i in 0..SKILLS_COUNT {
            let row = f64::from(i / 3);
            let col = f64::from(i % 3);
            flow.place(
                skill(i),
                ElementBox::new(skills + 320.0 + row * 300.0, 80.0 + col * 400.0, 360.0, 260.0),
            );
        }

        let experience = flow.section(EXPERIENCE, 1200.0);
        flow.place(EXPERIENCE_HEADING, ElementBox::new(experience + 120.0, 80.0, 800.0, 120.0));
        for i in 0..JOBS {
            flow.place(job(i), ElementBox::new(experience + 320.0 + 280.0 * f64::from(i), 80.0, 900.0, 240.0));
        }

        let projects = flow.section(PROJECTS, height);
        flow.place(PROJECTS_HEADING, ElementBox::new(projects + 40.0, 80.0, 800.0, 100.0));
        flow.place(
            PROJECTS_TRACK,
            ElementBox::new(projects, 0.0, width, height).with_scroll_width(width * GALLERY_VIEWPORTS),
        );
        flow.place(PROJECTS_BAR, ElementBox::new(projects + height - 8.0, 0.0, width, 4.0));
        // Spacer giving the pin room to play out its horizontal overflow.
        flow.y += width * (GALLERY_VIEWPORTS - 1.0);

        let contact = flow.section(CONTACT, 900.0);
        flow.place(CONTACT_HEADING, ElementBox::new(contact + 120.0, 80.0, 800.0, 120.0));
        for i in 0..CONTACT_ITEMS {
            flow.place(
                contact_item(i),
                ElementBox::new(contact + 320.0 + 120.0 * f64::from(i), 80.0, 600.0, 80.0),
            );
        }

        flow.section(FOOTER, 200.0);

        let mut layout = flow.layout;
        layout.set_document_height(flow.y);
        Self {
            layout,
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Deepest scroll position.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        use scrollweave_core::LayoutSource;
        (self.layout.document_height() - self.viewport_height).max(0.0)
    }

    /// Create a scope on `host` and register the whole page.
    pub fn mount(&self, host: &mut WebHost, signals: DeviceSignals) -> Result<Mounted> {
        let scope = host.mount(signals);
        let mut headings = Vec::new();
        let engine = host.engine_mut();

        // Global scroll progress.
        engine.register_scrub_animation(
            scope,
            PROGRESS,
            AnimatedProperties::default().scale_x(0.0),
            AnimatedProperties::default().scale_x(1.0),
            ScrubBoundaries::document().smoothing(Duration::from_millis(300)),
        )?;

        // Hero parallax layers.
        for (layer, depth) in [(HERO_BG_TEXT, -100.0), (HERO_CANVAS, -250.0), (HERO_CONTENT, -400.0)] {
            engine.register_scrub_animation(
                scope,
                layer,
                AnimatedProperties::default().y(0.0),
                AnimatedProperties::default().y(depth),
                ScrubBoundaries::new()
                    .trigger(HERO)
                    .start(BoundaryExpr::TOP_TOP)
                    .end(BoundaryExpr::BOTTOM_TOP),
            )?;
        }

        // Section headings.
        for heading in HEADINGS {
            headings.push(engine.register_reveal_trigger(scope, heading, engine.reveal_options())?);
        }

        engine.register_reveal_trigger(
            scope,
            ABOUT_TEXT,
            engine.reveal_options().duration(Duration::from_millis(800)),
        )?;
        for (i, delay) in (0..).zip(stagger(STATS, Duration::from_millis(150))) {
            engine.register_reveal_trigger(
                scope,
                stat(i),
                engine
                    .reveal_options()
                    .trigger(ABOUT_STATS)
                    .duration(Duration::from_millis(800))
                    .delay(delay),
            )?;
        }

        let top_85 = BoundaryExpr::new(Position::TOP, Position::Fraction(0.85));
        for (i, delay) in (0..).zip(stagger(SKILLS_COUNT, Duration::from_millis(80))) {
            engine.register_reveal_trigger(
                scope,
                skill(i),
                engine
                    .reveal_options()
                    .start(top_85)
                    .duration(Duration::from_millis(700))
                    .delay(delay),
            )?;
        }
        for i in 0..JOBS {
            engine.register_reveal_trigger(
                scope,
                job(i),
                engine
                    .reveal_options()
                    .start(top_85)
                    .duration(Duration::from_millis(800)),
            )?;
        }

        engine.register_pin_region(
            scope,
            PROJECTS_TRACK,
            PinOptions::new(PROJECTS)
                .progress_bar(PROJECTS_BAR)
                .smoothing(Duration::from_secs(1))
                .bar_smoothing(Duration::from_millis(300))
                .fallback_reveal(PROJECTS_TRACK),
        )?;

        let top_90 = BoundaryExpr::new(Position::TOP, Position::Fraction(0.9));
        for (i, (delay_ms, start)) in (0..).zip([(200, top_85), (300, top_90), (400, top_90)]) {
            engine.register_reveal_trigger(
                scope,
                contact_item(i),
                engine
                    .reveal_options()
                    .start(start)
                    .duration(Duration::from_millis(800))
                    .delay(Duration::from_millis(delay_ms)),
            )?;
        }

        let boot = engine.play_boot_timeline(scope, loader())?;
        engine.play_timeline(scope, intro())?;
        engine.play_timeline(scope, scroll_pulse())?;

        for (trigger, heading) in headings.iter().zip(HEADINGS) {
            host.bind_class(*trigger, heading, IN_VIEW);
        }

        Ok(Mounted { scope, boot, headings })
    }
}

/// Loader bar fill, then the wipe; 3.8s in total.
pub fn loader() -> Timeline {
    Timeline::new()
        .add(
            Duration::ZERO,
            TimelineStep::new(LOADER_BAR, Duration::from_millis(2_500))
                .from(AnimatedProperties::default().scale_x(0.0))
                .to(AnimatedProperties::default().scale_x(1.0))
                .easing(Easing::PowerInOut(2)),
        )
        .add(
            Duration::from_millis(2_800),
            TimelineStep::new(LOADER, Duration::from_secs(1))
                .from(AnimatedProperties::default().y_percent(0.0))
                .to(AnimatedProperties::default().y_percent(-100.0))
                .easing(Easing::PowerInOut(4)),
        )
}

/// Nav drop-in, title letters, subtitle and scroll hint, timed to land as
/// the loader lifts.
pub fn intro() -> Timeline {
    let mut tl = Timeline::new().add(
        Duration::from_millis(3_500),
        TimelineStep::new(NAV, Duration::from_secs(1))
            .from(AnimatedProperties::default().y(-100.0).opacity(0.0))
            .to(AnimatedProperties::default().y(0.0).opacity(1.0))
            .easing(Easing::PowerOut(3)),
    );
    for (i, _) in (0u32..).zip(TITLE.chars()) {
        let offset = Duration::from_millis(60) * i;
        tl = tl.add(
            Duration::from_millis(3_200) + offset,
            TimelineStep::new(letter(i), Duration::from_secs(1))
                .from(AnimatedProperties::default().y(100.0).opacity(0.0).rotate_x(-FRAC_PI_2))
                .to(AnimatedProperties::default().y(0.0).opacity(1.0).rotate_x(0.0))
                .easing(Easing::PowerOut(4)),
        );
    }
    tl.add(
        Duration::from_secs(4),
        TimelineStep::new(HERO_SUBTITLE, Duration::from_millis(800))
            .from(AnimatedProperties::default().y(20.0).opacity(0.0))
            .to(AnimatedProperties::default().y(0.0).opacity(1.0))
            .easing(Easing::PowerOut(3)),
    )
    .add(
        Duration::from_millis(4_500),
        TimelineStep::new(SCROLL_HINT, Duration::from_secs(1))
            .from(AnimatedProperties::default().opacity(0.0))
            .to(AnimatedProperties::default().opacity(1.0)),
    )
}

/// Endless scroll-hint pulse. It sits under the hidden hint until the intro
/// fades that in.
pub fn scroll_pulse() -> Timeline {
    Timeline::new()
        .add(
            Duration::ZERO,
            TimelineStep::new(SCROLL_LINE, Duration::from_secs(1))
                .from(AnimatedProperties::default().scale_y(1.0))
                .to(AnimatedProperties::default().scale_y(1.5))
                .easing(Easing::PowerInOut(1)),
        )
        .set_loop_count(LoopCount::Infinite)
        .yoyo(true)
}

use std::rc::Rc;

use proptest::prelude::*;
use retro_sprites::*;

/// One 8x8 frame and one 16x16 frame, both filled with distinct indices.
fn spriteset() -> Rc<Spriteset> {
    let mut bitmap = Bitmap::new(24, 16, PixelFormat::Indexed8).unwrap();
    for y in 0..16 {
        for x in 0..24 {
            bitmap.put_pixel(x, y, &[(y * 24 + x) as u8 % 200 + 1]);
        }
    }
    let manifest = SpritesetManifest::from_json(
        r#"{ "frames": [
            { "name": "small", "x": 0, "y": 0, "w": 8, "h": 8 },
            { "name": "big", "x": 8, "y": 0, "w": 16, "h": 16 }
        ] }"#,
    )
    .unwrap();
    let palette = Palette::from_colors((0..=255u8).map(|i| Color::rgb(i, i, i)).collect());
    Rc::new(Spriteset::from_manifest(bitmap, &manifest, Some(Rc::new(palette))).unwrap())
}

fn engine() -> SpriteEngine {
    let mut engine = SpriteEngine::new(EngineConfig::default());
    engine.configure_sprite(0, &spriteset(), SpriteFlags::NONE).unwrap();
    engine
}

#[test]
fn doubled_small_frame_is_centred_and_clipped() {
    let mut engine = engine();
    engine.set_sprite_position(0, 0, 0).unwrap();
    engine.set_sprite_scaling(0, 2.0, 2.0).unwrap();

    let s = engine.sprite(0).unwrap();
    // centred on the 8x8 footprint: [-4, 12) before clipping
    assert_eq!(s.dstrect(), Rect::new(0, 0, 12, 12));
    assert_eq!(s.srcrect().x1, Fix::from_int(2));
    assert_eq!(s.srcrect().x2, Fix::from_int(8));
    assert_eq!(s.step(), FixVec2::new(Fix::HALF, Fix::HALF));
}

#[test]
fn unclipped_scaling_spans_whole_frame() {
    let mut engine = engine();
    engine.set_sprite_position(0, 100, 100).unwrap();
    engine.set_sprite_scaling(0, 2.0, 2.0).unwrap();
    let s = engine.sprite(0).unwrap();
    assert_eq!(s.dstrect(), Rect::new(96, 96, 112, 112));
    assert_eq!(s.srcrect().to_int(), Rect::new(0, 0, 8, 8));
}

#[test]
fn half_turn_surface_is_point_reflection() {
    let mut engine = engine();
    engine.set_sprite_picture_by_name(0, "big").unwrap();
    engine.set_sprite_position(0, 30, 30).unwrap();
    engine.set_sprite_rotation(0, 180.0).unwrap();

    let set = spriteset();
    let view = set.frame_view(1).unwrap();
    let s = engine.sprite(0).unwrap();
    let surface = s.rotation_surface().unwrap();
    assert_eq!(surface.size(), glam::IVec2::new(16, 16));
    for y in 0..16 {
        for x in 0..16 {
            let src = set.bitmap().view_row(&view, 15 - y).unwrap()[15 - x];
            assert_eq!(surface.bitmap().pixel(x, y).unwrap()[0], src);
        }
    }
}

#[test]
fn rotation_far_off_screen_matches_rotation_at_origin() {
    let mut near = engine();
    near.set_sprite_rotation(0, 0.0).unwrap();

    let mut far = engine();
    far.set_sprite_position(0, 20_000_001, -100_000_001).unwrap();
    far.set_sprite_rotation(0, 0.0).unwrap();

    let near = near.sprite(0).unwrap().rotation_surface().unwrap();
    let far = far.sprite(0).unwrap().rotation_surface().unwrap();
    assert_eq!(far.size(), glam::IVec2::new(8, 8));
    assert_eq!(far.offset(), glam::IVec2::ZERO);
    assert_eq!(far.bitmap().data(), near.bitmap().data());
}

#[test]
fn changing_picture_of_rotated_sprite_rerotates() {
    let mut engine = engine();
    engine.set_sprite_rotation(0, 90.0).unwrap();
    assert_eq!(engine.sprite(0).unwrap().rotation_surface().unwrap().size(), glam::IVec2::new(8, 8));
    engine.set_sprite_picture(0, 1).unwrap();
    let s = engine.sprite(0).unwrap();
    assert_eq!(s.mode(), SpriteMode::Transform);
    assert_eq!(s.rotation_surface().unwrap().size(), glam::IVec2::new(16, 16));
    assert_eq!(s.rotation_surface().unwrap().angle(), 90.0);
}

#[test]
fn failed_calls_leave_sprite_untouched() {
    let mut engine = engine();
    engine.set_sprite_position(0, 10, 20).unwrap();
    engine.set_sprite_scaling(0, 1.5, 1.5).unwrap();
    let before = (
        engine.sprite(0).unwrap().dstrect(),
        engine.sprite(0).unwrap().srcrect(),
        engine.sprite(0).unwrap().mode(),
    );

    assert!(engine.set_sprite_scaling(0, -1.0, 1.0).is_err());
    assert_eq!(engine.last_error(), ErrorCode::WrongParam);
    assert!(engine.set_sprite_picture(0, 7).is_err());
    assert_eq!(engine.last_error(), ErrorCode::IdxPicture);
    assert!(engine.set_sprite_blend_mode(0, BlendMode::Custom).is_err());
    assert_eq!(engine.last_error(), ErrorCode::Reference);

    let s = engine.sprite(0).unwrap();
    assert_eq!((s.dstrect(), s.srcrect(), s.mode()), before);
    assert_eq!(engine.last_error(), ErrorCode::Ok);
}

#[test]
fn rendered_frame_matches_flipped_source() {
    let mut engine = SpriteEngine::new(EngineConfig { width: 16, height: 8, num_sprites: 1 });
    engine.configure_sprite(0, &spriteset(), SpriteFlags::FLIP_X).unwrap();
    engine.set_sprite_position(0, -2, 0).unwrap();

    let mut fb = Framebuffer::for_config(engine.config());
    engine.render(&mut fb);

    // screen x=0 shows unflipped column 8-1-2 = 5 of the small frame
    let expected = (5u32 + 1) & 0xFF;
    assert_eq!(fb.pixel(0, 0), Some(0xFF00_0000 | expected << 16 | expected << 8 | expected));
    assert_eq!(fb.pixel(6, 0), Some(0));
}

#[test]
fn slots_are_independent() {
    let mut engine = engine();
    engine.configure_sprite(1, &spriteset(), SpriteFlags::NONE).unwrap();
    engine.set_sprite_rotation(1, 45.0).unwrap();
    engine.set_sprite_position(0, 5, 5).unwrap();
    assert_eq!(engine.sprite(0).unwrap().mode(), SpriteMode::Normal);
    assert_eq!(engine.sprite(1).unwrap().position(), glam::IVec2::ZERO);
    assert_eq!(engine.get_available_sprite(), Some(2));
}

proptest! {
    #[test]
    fn any_position_stays_on_screen(
        x in -1000i32..1000,
        y in -1000i32..1000,
        scale in prop::option::of(0.1f32..6.0),
        angle in prop::option::of(-720.0f32..720.0),
    ) {
        let mut engine = engine();
        engine.set_sprite_position(0, x, y).unwrap();
        if let Some(s) = scale {
            engine.set_sprite_scaling(0, s, s).unwrap();
        }
        if let Some(a) = angle {
            engine.set_sprite_rotation(0, a).unwrap();
        }
        let screen = Rect::new(0, 0, 256, 224);
        prop_assert!(screen.contains_rect(&engine.sprite(0).unwrap().dstrect()));
    }

    #[test]
    fn reset_scaling_restores_placement(x in -20i32..270, y in -20i32..240, s in 0.2f32..5.0) {
        let mut engine = engine();
        engine.set_sprite_position(0, x, y).unwrap();
        let original = engine.sprite(0).unwrap().dstrect();
        engine.set_sprite_scaling(0, s, 1.0 / s).unwrap();
        engine.reset_sprite_scaling(0).unwrap();
        let sprite = engine.sprite(0).unwrap();
        prop_assert_eq!(sprite.dstrect(), original);
        prop_assert_eq!(sprite.scale(), glam::Vec2::ONE);
    }

    #[test]
    fn out_of_range_ids_change_nothing(id in 64usize..10_000) {
        let mut engine = engine();
        let before = engine.get_available_sprite();
        prop_assert!(engine.set_sprite_position(id, 1, 1).is_err());
        prop_assert!(engine.set_sprite_rotation(id, 10.0).is_err());
        prop_assert!(engine.disable_sprite(id).is_err());
        prop_assert_eq!(engine.last_error(), ErrorCode::IdxSprite);
        prop_assert_eq!(engine.get_available_sprite(), before);
    }
}

use crate::canvas::Surface;

pub mod milkyway;

pub trait Effect {
    fn update(&mut self);
    fn render(&mut self, surface: &mut Surface);
}

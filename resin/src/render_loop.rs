use winit::event::{ElementState, VirtualKeyCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Close-flag bookkeeping for the frame loop.
///
/// Input only raises the flag; it is acted on at the start of the next
/// iteration, so the frame in flight still completes.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    close_requested: bool,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self {
            state: LoopState::Running,
            close_requested: false,
            frames: 0,
        }
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn handle_key(&mut self, key: Option<VirtualKeyCode>, state: ElementState) {
        if key == Some(VirtualKeyCode::Escape) && state == ElementState::Pressed {
            log::debug!("escape pressed, closing");
            self.request_close();
        }
    }

    /// Runs one iteration. `frame` is only called while running.
    pub fn step<E>(&mut self, frame: impl FnOnce() -> Result<(), E>) -> Result<LoopState, E> {
        if self.state == LoopState::Closing || self.close_requested {
            self.state = LoopState::Closing;
            return Ok(self.state);
        }

        frame()?;
        self.frames += 1;

        Ok(self.state)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn draw(count: &mut u32) -> impl FnOnce() -> Result<(), Infallible> + '_ {
        move || {
            *count += 1;
            Ok(())
        }
    }

    #[test]
    fn draws_while_running() {
        let mut rl = RenderLoop::new();
        let mut draws = 0;

        assert_eq!(rl.step(draw(&mut draws)), Ok(LoopState::Running));
        assert_eq!(rl.step(draw(&mut draws)), Ok(LoopState::Running));

        assert_eq!(draws, 2);
        assert_eq!(rl.frames(), 2);
    }

    #[test]
    fn escape_closes_on_next_iteration_without_drawing() {
        let mut rl = RenderLoop::new();
        let mut draws = 0;

        rl.step(draw(&mut draws)).unwrap();
        rl.handle_key(Some(VirtualKeyCode::Escape), ElementState::Pressed);

        assert_eq!(rl.state(), LoopState::Running);
        assert_eq!(rl.step(draw(&mut draws)), Ok(LoopState::Closing));
        assert_eq!(draws, 1);
    }

    #[test]
    fn other_keys_and_releases_are_ignored() {
        let mut rl = RenderLoop::new();

        rl.handle_key(Some(VirtualKeyCode::Space), ElementState::Pressed);
        rl.handle_key(Some(VirtualKeyCode::Escape), ElementState::Released);
        rl.handle_key(None, ElementState::Pressed);

        let mut draws = 0;
        assert_eq!(rl.step(draw(&mut draws)), Ok(LoopState::Running));
        assert_eq!(draws, 1);
    }

    #[test]
    fn closing_is_terminal() {
        let mut rl = RenderLoop::new();
        let mut draws = 0;

        rl.request_close();
        rl.step(draw(&mut draws)).unwrap();

        assert_eq!(rl.step(draw(&mut draws)), Ok(LoopState::Closing));
        assert_eq!(draws, 0);
        assert_eq!(rl.frames(), 0);
    }

    #[test]
    fn frame_errors_propagate_and_do_not_count() {
        let mut rl = RenderLoop::new();

        let res = rl.step(|| Err("swap failed"));

        assert_eq!(res, Err("swap failed"));
        assert_eq!(rl.frames(), 0);
        assert_eq!(rl.state(), LoopState::Running);
    }
}
